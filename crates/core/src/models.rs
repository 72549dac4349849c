//! Serde models for the portal API's JSON.
//!
//! Response models accept unknown keys: the API returns more than the screens use.
//! Request bodies are the exact objects the API expects.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use unicare_validation::{FieldValue, FormValues};

pub use unicare_messaging::{ChatMessage, ConversationOverview as MessageOverview, LastMessage};

/// The `{status, message}` acknowledgement most write endpoints return.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusMessage {
    pub status: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthToken {
    pub status: String,
    pub message: String,
    pub token: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Credentials<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Faculty {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FacultyList {
    pub faculties: Vec<Faculty>,
}

/// A booked appointment. Doctor-side listings also carry the student's display fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    #[serde(rename = "_id")]
    pub id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub checked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faculty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentLists {
    #[serde(default)]
    pub ongoing_appointments: Vec<Appointment>,
    #[serde(default)]
    pub upcoming_appointments: Vec<Appointment>,
    #[serde(default)]
    pub previous_appointments: Vec<Appointment>,
}

/// A consultation window, in minutes after midnight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlot {
    #[serde(rename = "_id")]
    pub id: String,
    pub start_time: u32,
    pub end_time: u32,
}

pub type FreeSlot = TimeSlot;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TimeSlotList {
    pub slots: Vec<TimeSlot>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreeSlotList {
    pub free_slots: Vec<FreeSlot>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTimeSlot {
    pub start_time: u32,
    pub end_time: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentRequest {
    pub date: NaiveDate,
    pub timeslot_id: String,
    pub description: String,
}

impl AppointmentRequest {
    pub fn form_values(&self) -> FormValues {
        FormValues::from([
            ("date".to_string(), FieldValue::Date(self.date)),
            ("timeslotId".to_string(), FieldValue::from(&self.timeslot_id)),
            ("description".to_string(), FieldValue::from(&self.description)),
        ])
    }
}

/// A student card in the patient list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentSummary {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub reg_no: Option<String>,
    #[serde(default)]
    pub index_no: Option<String>,
    #[serde(default)]
    pub upcoming_appointments: u32,
    #[serde(default, rename = "onGoingAppointments")]
    pub ongoing_appointments: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StudentList {
    pub students: Vec<StudentSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctor_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctor_reg_no: Option<String>,
    pub disease: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Full student profile.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    #[serde(rename = "_id", default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub birthday: Option<String>,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub reg_no: String,
    #[serde(default)]
    pub index_no: String,
    #[serde(default)]
    pub faculty: String,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub blood_group: String,
    #[serde(default)]
    pub diseases: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub health_records: Vec<HealthRecord>,
}

impl Student {
    /// The profile as form input, keyed by the field names the rule tables use.
    pub fn form_values(&self) -> FormValues {
        FormValues::from([
            ("firstName".to_string(), FieldValue::from(&self.first_name)),
            ("lastName".to_string(), FieldValue::from(&self.last_name)),
            ("gender".to_string(), FieldValue::from(&self.gender)),
            ("birthday".to_string(), FieldValue::from(self.birthday.clone())),
            ("phone".to_string(), FieldValue::from(&self.phone)),
            ("email".to_string(), FieldValue::from(&self.email)),
            ("address".to_string(), FieldValue::from(&self.address)),
            ("bio".to_string(), FieldValue::from(&self.bio)),
            ("regNo".to_string(), FieldValue::from(&self.reg_no)),
            ("indexNo".to_string(), FieldValue::from(&self.index_no)),
            ("faculty".to_string(), FieldValue::from(&self.faculty)),
            ("height".to_string(), FieldValue::from(self.height)),
            ("weight".to_string(), FieldValue::from(self.weight)),
            ("bloodGroup".to_string(), FieldValue::from(&self.blood_group)),
            ("diseases".to_string(), FieldValue::from(self.diseases.clone())),
        ])
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StudentEnvelope {
    pub student: Student,
}

/// Student details with their appointments, as shown when a doctor opens a patient.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientFile {
    pub student: Student,
    #[serde(flatten)]
    pub appointments: AppointmentLists,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewHealthRecord {
    pub student_id: String,
    pub disease: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appointment_id: Option<String>,
}

impl NewHealthRecord {
    pub fn form_values(&self) -> FormValues {
        FormValues::from([
            ("disease".to_string(), FieldValue::from(&self.disease)),
            ("description".to_string(), FieldValue::from(&self.description)),
        ])
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Disease {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DiseaseList {
    pub diseases: Vec<Disease>,
}

/// Doctor profile.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    #[serde(rename = "_id", default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub birthday: Option<String>,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub mc_reg_no: String,
    #[serde(default)]
    pub specialize: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Doctor {
    pub fn form_values(&self) -> FormValues {
        FormValues::from([
            ("firstName".to_string(), FieldValue::from(&self.first_name)),
            ("lastName".to_string(), FieldValue::from(&self.last_name)),
            ("gender".to_string(), FieldValue::from(&self.gender)),
            ("birthday".to_string(), FieldValue::from(self.birthday.clone())),
            ("phone".to_string(), FieldValue::from(&self.phone)),
            ("email".to_string(), FieldValue::from(&self.email)),
            ("bio".to_string(), FieldValue::from(&self.bio)),
            ("mcRegNo".to_string(), FieldValue::from(&self.mc_reg_no)),
            ("specialize".to_string(), FieldValue::from(self.specialize.clone())),
        ])
    }

    pub fn display_name(&self) -> String {
        format!("Dr. {} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DoctorEnvelope {
    pub doctor: Doctor,
}

/// The doctor shown at the top of the student's emergency thread.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorCard {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub last_seen: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StudentThread {
    pub doctor: Option<DoctorCard>,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OverviewList {
    pub overviews: Vec<MessageOverview>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MessageList {
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutgoingMessage<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_id: Option<&'a str>,
    pub text: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearCount {
    pub year: String,
    pub count: u32,
}

/// Appointments per year for one faculty, plotted on the doctor dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacultySeries {
    pub faculty: String,
    #[serde(default)]
    pub years: Vec<YearCount>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DoctorHome {
    #[serde(default)]
    pub online: bool,
    #[serde(default)]
    pub appointments: Vec<Appointment>,
    #[serde(default)]
    pub graph: Vec<FacultySeries>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OnlineStatus {
    pub status: String,
    pub message: String,
    pub online: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

impl PasswordChange {
    pub fn form_values(&self) -> FormValues {
        FormValues::from([
            ("currentPassword".to_string(), FieldValue::from(&self.current_password)),
            ("newPassword".to_string(), FieldValue::from(&self.new_password)),
            ("confirmPassword".to_string(), FieldValue::from(&self.confirm_password)),
        ])
    }
}

/// Acknowledgement carrying the updated student profile.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StudentUpdate {
    pub status: String,
    pub message: String,
    pub student: Student,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DoctorUpdate {
    pub status: String,
    pub message: String,
    pub doctor: Doctor,
}
