//! The validation pipeline.
//!
//! Checks run in a fixed order and stop at the first failure:
//! 1. presence (required / optional short-circuit)
//! 2. coercion of the value into the rule's kind
//! 3. lower bound
//! 4. upper bound
//! 5. pattern
//! 6. allowed values
//!
//! A value that is both too short and malformed therefore reports only the length
//! violation.

use crate::rule::{Bounds, DateBound, Rule, RuleKind};
use crate::value::{format_time, parse_date, parse_time, whole_number, FieldValue};
use chrono::{Local, NaiveDate, NaiveTime};
use serde::Serialize;
use std::fmt::Display;

pub const VALID_MESSAGE: &str = "This field is valid";
pub const REQUIRED_MESSAGE: &str = "This field is required";
pub const FORMAT_MESSAGE: &str = "This field is not in the correct format";
pub const NOT_ALLOWED_MESSAGE: &str = "This field value is not an accepted value";
pub const UNRECOGNIZED_DATE_MESSAGE: &str = "This field has an unrecognized date format";
pub const UNRECOGNIZED_TIME_MESSAGE: &str = "This field has an unrecognized time format";
pub const NOT_A_NUMBER_MESSAGE: &str = "This field must be a number";
pub const NOT_A_WHOLE_NUMBER_MESSAGE: &str = "This field must be a whole number";

/// Which check rejected a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Violation {
    Required,
    BelowMinimum,
    AboveMaximum,
    TooShort,
    TooLong,
    TooEarly,
    TooLate,
    PatternMismatch,
    NotAllowed,
    Unparsable,
}

/// Outcome of validating one value: always exactly one message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verdict {
    pub valid: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub violation: Option<Violation>,
}

impl Verdict {
    pub fn pass() -> Self {
        Self {
            valid: true,
            message: VALID_MESSAGE.to_string(),
            violation: None,
        }
    }

    pub fn fail(violation: Violation, message: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: message.into(),
            violation: Some(violation),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }
}

/// Validates `value` against `rule`, resolving `"today"` to the local calendar day.
pub fn validate(rule: &Rule, value: &FieldValue) -> Verdict {
    validate_at(rule, value, Local::now().date_naive())
}

/// Validates `value` against `rule` with an explicit current day.
pub fn validate_at(rule: &Rule, value: &FieldValue, today: NaiveDate) -> Verdict {
    if is_empty(rule.kind(), value) {
        return if rule.is_required() {
            Verdict::fail(Violation::Required, REQUIRED_MESSAGE)
        } else {
            Verdict::pass()
        };
    }

    match run_checks(rule, value, today) {
        Ok(()) => Verdict::pass(),
        Err(verdict) => verdict,
    }
}

/// Absent values, empty text and numeric zero count as empty.
fn is_empty(kind: &RuleKind, value: &FieldValue) -> bool {
    match value {
        FieldValue::Absent => true,
        FieldValue::Text(text) if text.is_empty() => true,
        FieldValue::Integer(n) => *n == 0,
        FieldValue::Float(n) => *n == 0.0,
        FieldValue::Text(text) if matches!(kind, RuleKind::Integer(_) | RuleKind::Float(_)) => {
            text.trim().parse::<f64>().is_ok_and(|n| n == 0.0)
        }
        _ => false,
    }
}

fn run_checks(rule: &Rule, value: &FieldValue, today: NaiveDate) -> Result<(), Verdict> {
    match rule.kind() {
        RuleKind::Integer(bounds) => {
            let n = coerce_integer(value)?;
            check_number(n, bounds)?;
        }
        RuleKind::Float(bounds) => {
            let n = coerce_float(value)?;
            check_number(n, bounds)?;
        }
        RuleKind::Text(bounds) => check_length(&value.as_text(), bounds)?,
        RuleKind::Date(bounds) => {
            let date = coerce_date(value)?;
            check_date(date, bounds, today)?;
        }
        RuleKind::Time(bounds) => {
            let time = coerce_time(value)?;
            check_time(time, bounds)?;
        }
    }

    let text = value.as_text();
    check_pattern(rule, &text)?;
    check_allowed(rule, &text)
}

fn check_number<T: PartialOrd + Copy + Display>(value: T, bounds: &Bounds<T>) -> Result<(), Verdict> {
    if let Some(min) = bounds.min {
        if value < min {
            return Err(Verdict::fail(
                Violation::BelowMinimum,
                format!("This field must be greater than or equal to {min}"),
            ));
        }
    }
    if let Some(max) = bounds.max {
        if value > max {
            return Err(Verdict::fail(
                Violation::AboveMaximum,
                format!("This field must be less than or equal to {max}"),
            ));
        }
    }
    Ok(())
}

fn check_length(text: &str, bounds: &Bounds<usize>) -> Result<(), Verdict> {
    let len = text.chars().count();
    if let Some(min) = bounds.min {
        if len < min {
            return Err(Verdict::fail(
                Violation::TooShort,
                format!("This field must have at least {min} characters"),
            ));
        }
    }
    if let Some(max) = bounds.max {
        if len > max {
            return Err(Verdict::fail(
                Violation::TooLong,
                format!("This field cannot exceed {max} characters"),
            ));
        }
    }
    Ok(())
}

fn check_date(date: NaiveDate, bounds: &Bounds<DateBound>, today: NaiveDate) -> Result<(), Verdict> {
    if let Some(min) = bounds.min {
        if date < min.resolve(today) {
            return Err(Verdict::fail(
                Violation::TooEarly,
                format!("This field must have a date on or after {min}"),
            ));
        }
    }
    if let Some(max) = bounds.max {
        if date > max.resolve(today) {
            return Err(Verdict::fail(
                Violation::TooLate,
                format!("This field must have a date on or before {max}"),
            ));
        }
    }
    Ok(())
}

fn check_time(time: NaiveTime, bounds: &Bounds<NaiveTime>) -> Result<(), Verdict> {
    if let Some(min) = bounds.min {
        if time < min {
            return Err(Verdict::fail(
                Violation::TooEarly,
                format!("This field must have a time at or after {}", format_time(min)),
            ));
        }
    }
    if let Some(max) = bounds.max {
        if time > max {
            return Err(Verdict::fail(
                Violation::TooLate,
                format!("This field must have a time at or before {}", format_time(max)),
            ));
        }
    }
    Ok(())
}

fn check_pattern(rule: &Rule, text: &str) -> Result<(), Verdict> {
    match rule.regex() {
        Some(regex) if !regex.is_match(text) => Err(Verdict::fail(
            Violation::PatternMismatch,
            rule.pattern_message().unwrap_or(FORMAT_MESSAGE),
        )),
        _ => Ok(()),
    }
}

fn check_allowed(rule: &Rule, text: &str) -> Result<(), Verdict> {
    let allowed = rule.allowed();
    if !allowed.is_empty() && !allowed.iter().any(|candidate| candidate == text) {
        return Err(Verdict::fail(Violation::NotAllowed, NOT_ALLOWED_MESSAGE));
    }
    Ok(())
}

fn coerce_integer(value: &FieldValue) -> Result<i64, Verdict> {
    let unparsable = || Verdict::fail(Violation::Unparsable, NOT_A_WHOLE_NUMBER_MESSAGE);
    match value {
        FieldValue::Integer(n) => Ok(*n),
        FieldValue::Float(n) => whole_number(*n).ok_or_else(unparsable),
        FieldValue::Text(text) => text.trim().parse::<i64>().map_err(|_| unparsable()),
        _ => Err(unparsable()),
    }
}

fn coerce_float(value: &FieldValue) -> Result<f64, Verdict> {
    let parsed = match value {
        FieldValue::Integer(n) => Some(*n as f64),
        FieldValue::Float(n) => Some(*n),
        FieldValue::Text(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed
        .filter(|n| n.is_finite())
        .ok_or_else(|| Verdict::fail(Violation::Unparsable, NOT_A_NUMBER_MESSAGE))
}

fn coerce_date(value: &FieldValue) -> Result<NaiveDate, Verdict> {
    let parsed = match value {
        FieldValue::Date(date) => Some(*date),
        FieldValue::Text(text) => parse_date(text),
        _ => None,
    };
    parsed.ok_or_else(|| Verdict::fail(Violation::Unparsable, UNRECOGNIZED_DATE_MESSAGE))
}

fn coerce_time(value: &FieldValue) -> Result<NaiveTime, Verdict> {
    let parsed = match value {
        FieldValue::Time(time) => Some(*time),
        FieldValue::Text(text) => parse_time(text),
        _ => None,
    };
    parsed.ok_or_else(|| Verdict::fail(Violation::Unparsable, UNRECOGNIZED_TIME_MESSAGE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::{Bounds, DateBound, Rule};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).expect("valid time")
    }

    fn today() -> NaiveDate {
        day(2026, 10, 16)
    }

    fn every_kind() -> Vec<Rule> {
        vec![
            Rule::integer(Bounds::between(1, 10)),
            Rule::float(Bounds::between(1.0, 10.0)),
            Rule::text(Bounds::between(3, 5)),
            Rule::date(Bounds::at_least(DateBound::Today)),
            Rule::time(Bounds::between(hm(8, 0), hm(17, 0))),
        ]
    }

    #[test]
    fn optional_rules_accept_empty_values() {
        for rule in every_kind() {
            for empty in [FieldValue::Absent, FieldValue::Text(String::new())] {
                let verdict = validate_at(&rule, &empty, today());
                assert!(verdict.valid, "{} rule rejected {empty:?}", rule.kind().name());
                assert_eq!(verdict.message, VALID_MESSAGE);
            }
        }
    }

    #[test]
    fn required_rules_reject_empty_values() {
        for rule in every_kind() {
            let rule = rule.required();
            for empty in [FieldValue::Absent, FieldValue::Text(String::new())] {
                let verdict = validate_at(&rule, &empty, today());
                assert!(!verdict.valid);
                assert_eq!(verdict.message, REQUIRED_MESSAGE);
                assert_eq!(verdict.violation, Some(Violation::Required));
            }
        }
    }

    #[test]
    fn numeric_zero_counts_as_empty() {
        let rule = Rule::float(Bounds::between(0.0, 300.0)).required();
        assert_eq!(
            validate_at(&rule, &FieldValue::Float(0.0), today()).violation,
            Some(Violation::Required)
        );
        assert_eq!(
            validate_at(&rule, &"0".into(), today()).violation,
            Some(Violation::Required)
        );
    }

    #[test]
    fn string_length_bounds_are_inclusive() {
        let rule = Rule::text(Bounds::between(5, 10));

        let short = validate_at(&rule, &"abcd".into(), today());
        assert_eq!(short.violation, Some(Violation::TooShort));
        assert_eq!(short.message, "This field must have at least 5 characters");

        let long = validate_at(&rule, &"abcdefghijk".into(), today());
        assert_eq!(long.violation, Some(Violation::TooLong));
        assert_eq!(long.message, "This field cannot exceed 10 characters");

        assert!(validate_at(&rule, &"abcde".into(), today()).valid);
        assert!(validate_at(&rule, &"abcdefghij".into(), today()).valid);
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        let rule = Rule::text(Bounds::at_most(4));
        assert!(validate_at(&rule, &"café".into(), today()).valid);
    }

    #[test]
    fn integer_bounds_are_inclusive_and_zero_is_a_real_bound() {
        let rule = Rule::integer(Bounds::between(0, 300));

        assert!(validate_at(&rule, &FieldValue::Integer(0), today()).valid);
        assert!(validate_at(&rule, &FieldValue::Integer(300), today()).valid);

        let below = validate_at(&rule, &FieldValue::Integer(-1), today());
        assert_eq!(below.violation, Some(Violation::BelowMinimum));
        assert_eq!(below.message, "This field must be greater than or equal to 0");

        let above = validate_at(&rule, &FieldValue::Integer(301), today());
        assert_eq!(above.violation, Some(Violation::AboveMaximum));
        assert_eq!(above.message, "This field must be less than or equal to 300");
    }

    #[test]
    fn float_rules_accept_text_input() {
        let rule = Rule::float(Bounds::between(0.0, 300.0)).required();
        assert!(validate_at(&rule, &"172.5".into(), today()).valid);
        assert_eq!(
            validate_at(&rule, &"-0.5".into(), today()).violation,
            Some(Violation::BelowMinimum)
        );
        let verdict = validate_at(&rule, &"tall".into(), today());
        assert_eq!(verdict.violation, Some(Violation::Unparsable));
        assert_eq!(verdict.message, NOT_A_NUMBER_MESSAGE);
        assert_eq!(
            validate_at(&rule, &"NaN".into(), today()).violation,
            Some(Violation::Unparsable)
        );
    }

    #[test]
    fn integer_rules_reject_fractions() {
        let rule = Rule::integer(Bounds::unbounded());
        assert!(validate_at(&rule, &FieldValue::Float(4.0), today()).valid);
        let verdict = validate_at(&rule, &"4.5".into(), today());
        assert_eq!(verdict.message, NOT_A_WHOLE_NUMBER_MESSAGE);

        let huge = Rule::integer(Bounds::unbounded()).pattern(r"^\d+$").expect("pattern");
        let verdict = validate_at(&huge, &FieldValue::Float(1e300), today());
        assert!(!verdict.valid);
        assert_eq!(verdict.violation, Some(Violation::Unparsable));
    }

    #[test]
    fn today_sentinel_as_upper_bound() {
        let rule = Rule::date(Bounds::at_most(DateBound::Today));

        assert!(validate_at(&rule, &FieldValue::Date(today()), today()).valid);
        assert!(validate_at(&rule, &"2026-10-16T23:59:00Z".into(), today()).valid);

        let tomorrow = validate_at(&rule, &FieldValue::Date(day(2026, 10, 17)), today());
        assert_eq!(tomorrow.violation, Some(Violation::TooLate));
        assert_eq!(tomorrow.message, "This field must have a date on or before today");
    }

    #[test]
    fn fixed_date_lower_bound() {
        let rule = Rule::date(Bounds::between(DateBound::On(day(1980, 1, 1)), DateBound::Today));

        assert!(validate_at(&rule, &"1980-01-01".into(), today()).valid);
        let early = validate_at(&rule, &"1979-12-31".into(), today());
        assert_eq!(early.violation, Some(Violation::TooEarly));
        assert_eq!(early.message, "This field must have a date on or after 1980-01-01");
    }

    #[test]
    fn unparsable_dates_and_times_are_rejected() {
        let date_rule = Rule::date(Bounds::at_least(DateBound::Today));
        let verdict = validate_at(&date_rule, &"next tuesday".into(), today());
        assert_eq!(verdict.violation, Some(Violation::Unparsable));
        assert_eq!(verdict.message, UNRECOGNIZED_DATE_MESSAGE);

        let time_rule = Rule::time(Bounds::unbounded());
        let verdict = validate_at(&time_rule, &"25:99".into(), today());
        assert_eq!(verdict.message, UNRECOGNIZED_TIME_MESSAGE);
    }

    #[test]
    fn time_bounds_compare_wall_clock() {
        let rule = Rule::time(Bounds::between(hm(8, 0), hm(17, 0))).required();

        assert!(validate_at(&rule, &"08:00 AM".into(), today()).valid);
        assert!(validate_at(&rule, &"05:00 PM".into(), today()).valid);

        let early = validate_at(&rule, &"07:59 AM".into(), today());
        assert_eq!(early.violation, Some(Violation::TooEarly));
        assert_eq!(early.message, "This field must have a time at or after 08:00 AM");

        let late = validate_at(&rule, &FieldValue::Time(hm(17, 1)), today());
        assert_eq!(late.message, "This field must have a time at or before 05:00 PM");
    }

    #[test]
    fn pattern_failure_uses_configured_message() {
        let rule = Rule::text(Bounds::unbounded())
            .pattern(r"^0\d{9}$")
            .expect("pattern compiles");
        assert!(validate_at(&rule, &"0712345678".into(), today()).valid);
        assert_eq!(validate_at(&rule, &"12345".into(), today()).message, FORMAT_MESSAGE);

        let rule = rule.pattern_error("Phone number must start with 0 and must contain 10 digits");
        let verdict = validate_at(&rule, &"12345".into(), today());
        assert_eq!(verdict.violation, Some(Violation::PatternMismatch));
        assert_eq!(
            verdict.message,
            "Phone number must start with 0 and must contain 10 digits"
        );
    }

    #[test]
    fn allowed_values_restrict_membership() {
        let rule = Rule::text(Bounds::unbounded()).allowed_values(["male", "female"]);
        assert!(validate_at(&rule, &"male".into(), today()).valid);

        let verdict = validate_at(&rule, &"other".into(), today());
        assert_eq!(verdict.violation, Some(Violation::NotAllowed));
        assert_eq!(verdict.message, NOT_ALLOWED_MESSAGE);
    }

    #[test]
    fn length_is_reported_before_pattern() {
        let rule = Rule::text(Bounds::at_least(8))
            .pattern(r"^\d+$")
            .expect("pattern compiles");
        let verdict = validate_at(&rule, &"ab".into(), today());
        assert_eq!(verdict.violation, Some(Violation::TooShort));
    }

    #[test]
    fn validation_is_repeatable() {
        let rule = Rule::text(Bounds::between(2, 4)).required();
        let value = FieldValue::from("abcdef");
        let first = validate_at(&rule, &value, today());
        let second = validate_at(&rule, &value, today());
        assert_eq!(first, second);
    }

    #[test]
    fn verdict_serialises_without_empty_violation() {
        let json = serde_json::to_value(Verdict::pass()).expect("serialise");
        assert_eq!(
            json,
            serde_json::json!({ "valid": true, "message": VALID_MESSAGE })
        );
    }
}
