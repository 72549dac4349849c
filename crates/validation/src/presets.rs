//! The portal's form rule tables.
//!
//! Field order matters: multi-step and sectioned forms validate contiguous slices of these
//! tables (see [`student_signup_step`], [`student_profile_section`] and
//! [`doctor_profile_section`]).

use crate::form::FormRules;
use crate::rule::{Bounds, DateBound, Rule};
use chrono::{NaiveDate, NaiveTime};
use regex::Regex;
use std::sync::LazyLock;

pub const PHONE_PATTERN: &str = r"^0\d{9}$";
pub const PHONE_ERROR: &str = "Phone number must start with 0 and must contain 10 digits";

pub const EMAIL_PATTERN: &str = r"^\S+@\S+\.\S+$";

/// At least one digit and one symbol, drawn from letters, digits and `!@#$%^&*`.
pub const PASSWORD_PATTERN: &str = r"^[A-Za-z0-9!@#$%^&*]*([0-9][A-Za-z0-9!@#$%^&*]*[!@#$%^&*]|[!@#$%^&*][A-Za-z0-9!@#$%^&*]*[0-9])[A-Za-z0-9!@#$%^&*]*$";
pub const PASSWORD_ERROR: &str = "The password must contain at least one symbol, one digit, one lowercase letter and one uppercase letter";

/// Reported by signup and password forms when the confirmation differs.
pub const CONFIRM_MISMATCH: &str = "Confirm password and password must same";

pub const GENDERS: [&str; 2] = ["male", "female"];
pub const BLOOD_GROUPS: [&str; 8] = ["a+", "a-", "b+", "b-", "o+", "o-", "ab+", "ab-"];

/// Largest accepted profile picture, in bytes.
pub const MAX_PROFILE_IMAGE_BYTES: usize = 3 * 1024 * 1024;

static PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(PHONE_PATTERN).expect("phone pattern compiles"));
static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(EMAIL_PATTERN).expect("email pattern compiles"));
static PASSWORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(PASSWORD_PATTERN).expect("password pattern compiles"));

fn earliest_birthday() -> DateBound {
    DateBound::On(NaiveDate::from_ymd_opt(1980, 1, 1).expect("valid date"))
}

fn clock(hour: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, 0, 0).expect("valid time")
}

fn name() -> Rule {
    Rule::text(Bounds::at_most(30)).required()
}

fn gender() -> Rule {
    Rule::text(Bounds::unbounded())
        .required()
        .allowed_values(GENDERS)
}

fn birthday() -> Rule {
    Rule::date(Bounds::between(earliest_birthday(), DateBound::Today)).required()
}

fn phone() -> Rule {
    Rule::text(Bounds::unbounded())
        .required()
        .with_regex(PHONE.clone())
        .pattern_error(PHONE_ERROR)
}

fn email() -> Rule {
    Rule::text(Bounds::at_most(50))
        .required()
        .with_regex(EMAIL.clone())
}

fn password() -> Rule {
    Rule::text(Bounds::between(8, 20))
        .required()
        .with_regex(PASSWORD.clone())
        .pattern_error(PASSWORD_ERROR)
}

fn bio() -> Rule {
    Rule::text(Bounds::between(100, 500)).required()
}

fn general_fields(form: FormRules) -> FormRules {
    form.field("firstName", name())
        .field("lastName", name())
        .field("gender", gender())
        .field("birthday", birthday())
        .field("phone", phone())
        .field("email", email())
}

fn registration_fields(form: FormRules) -> FormRules {
    form.field("regNo", Rule::text(Bounds::at_most(30)).required())
        .field("indexNo", Rule::text(Bounds::at_most(20)).required())
        .field("faculty", Rule::text(Bounds::unbounded()).required())
}

fn health_fields(form: FormRules) -> FormRules {
    form.field("height", Rule::float(Bounds::between(0.0, 300.0)).required())
        .field("weight", Rule::float(Bounds::between(0.0, 500.0)).required())
        .field(
            "bloodGroup",
            Rule::text(Bounds::unbounded())
                .required()
                .allowed_values(BLOOD_GROUPS),
        )
        .field("diseases", Rule::text(Bounds::at_most(1000)))
}

/// Student signup: general information (fields 0-9), registration (10-12) and health
/// (13-16).
pub fn student_signup() -> FormRules {
    let form = general_fields(FormRules::new())
        .field("password", password())
        .field("confirmPassword", Rule::text(Bounds::between(8, 20)).required())
        .field("address", Rule::text(Bounds::at_most(200)).required())
        .field("bio", bio());
    health_fields(registration_fields(form))
}

/// Fields checked before leaving signup step `step` (0, 1 or 2).
///
/// Each step re-checks every earlier field. Steps past the last return the whole form.
pub fn student_signup_step(step: usize) -> FormRules {
    let end = match step {
        0 => 10,
        1 => 13,
        _ => 17,
    };
    student_signup().slice(0, end)
}

/// Sections of the student profile screen, each saved through its own endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudentSection {
    General,
    Registration,
    Health,
}

pub fn student_profile() -> FormRules {
    let form = general_fields(FormRules::new())
        .field("address", Rule::text(Bounds::at_most(200)).required())
        .field("bio", bio());
    health_fields(registration_fields(form))
}

pub fn student_profile_section(section: StudentSection) -> FormRules {
    let form = student_profile();
    match section {
        StudentSection::General => form.slice(0, 8),
        StudentSection::Registration => form.slice(8, 3),
        StudentSection::Health => form.slice(11, 4),
    }
}

/// Sections of the doctor profile screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoctorSection {
    General,
    Professional,
}

pub fn doctor_profile() -> FormRules {
    general_fields(FormRules::new())
        .field("bio", bio())
        .field("mcRegNo", Rule::text(Bounds::at_most(50)).required())
        .field("specialize", Rule::text(Bounds::at_most(100)))
}

pub fn doctor_profile_section(section: DoctorSection) -> FormRules {
    let form = doctor_profile();
    match section {
        DoctorSection::General => form.slice(0, 7),
        DoctorSection::Professional => form.slice(7, 2),
    }
}

pub fn password_change() -> FormRules {
    FormRules::new()
        .field("currentPassword", Rule::text(Bounds::unbounded()).required())
        .field("newPassword", password())
        .field("confirmPassword", password())
}

pub fn appointment_request() -> FormRules {
    FormRules::new()
        .field("date", Rule::date(Bounds::at_least(DateBound::Today)).required())
        .field("timeslotId", Rule::text(Bounds::unbounded()).required())
        .field("description", Rule::text(Bounds::between(50, 500)).required())
}

/// Consultation slots run between 08:00 AM and 05:00 PM.
pub fn time_slot() -> FormRules {
    let window = || Rule::time(Bounds::between(clock(8), clock(17))).required();
    FormRules::new()
        .field("startTime", window())
        .field("endTime", window())
}

pub fn health_record() -> FormRules {
    FormRules::new()
        .field("disease", Rule::text(Bounds::at_most(50)).required())
        .field("description", Rule::text(Bounds::between(30, 1000)).required())
}

/// Looks a table up by the name used on the command line.
pub fn by_name(name: &str) -> Option<FormRules> {
    let form = match name {
        "student-signup" => student_signup(),
        "student-profile" => student_profile(),
        "doctor-profile" => doctor_profile(),
        "password-change" => password_change(),
        "appointment" => appointment_request(),
        "time-slot" => time_slot(),
        "health-record" => health_record(),
        _ => return None,
    };
    Some(form)
}

pub const FORM_NAMES: [&str; 7] = [
    "student-signup",
    "student-profile",
    "doctor-profile",
    "password-change",
    "appointment",
    "time-slot",
    "health-record",
];
