//! Candidate values and the parsers used to coerce form text into them.
//!
//! Form screens hand the engine whatever the input produced: usually text, sometimes an
//! already-typed number, date or time. Coercion into the rule's kind happens inside the
//! engine so that an unparsable value becomes a violation rather than a panic.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use std::fmt;

/// Portal display format for wall-clock times (`08:00 AM`).
pub const TIME_FORMAT: &str = "%I:%M %p";

/// Portal format for calendar days (`2026-01-31`).
pub const DATE_FORMAT: &str = "%Y-%m-%d";

const TIME_INPUT_FORMATS: &[&str] = &[TIME_FORMAT, "%I:%M%p", "%H:%M", "%H:%M:%S"];
const DATETIME_INPUT_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
];

/// A value submitted for one field.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum FieldValue {
    #[default]
    Absent,
    Text(String),
    Integer(i64),
    Float(f64),
    Date(NaiveDate),
    Time(NaiveTime),
}

impl FieldValue {
    /// The value as it would appear in a text input.
    ///
    /// Pattern and allowed-value checks run against this form.
    pub fn as_text(&self) -> String {
        match self {
            Self::Absent => String::new(),
            Self::Text(text) => text.clone(),
            Self::Integer(n) => n.to_string(),
            Self::Float(n) => n.to_string(),
            Self::Date(date) => format_date(*date),
            Self::Time(time) => format_time(*time),
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&String> for FieldValue {
    fn from(value: &String) -> Self {
        Self::Text(value.clone())
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl From<NaiveTime> for FieldValue {
    fn from(value: NaiveTime) -> Self {
        Self::Time(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Absent, Into::into)
    }
}

/// Parses a calendar day from `YYYY-MM-DD`, an RFC 3339 timestamp, or a naive
/// `YYYY-MM-DDTHH:MM:SS` timestamp. Timestamps keep their own calendar day.
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();

    if let Ok(date) = NaiveDate::parse_from_str(input, DATE_FORMAT) {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.date_naive());
    }
    DATETIME_INPUT_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
        .map(|dt| dt.date())
}

/// Parses a wall-clock time, preferring the 12-hour `hh:mm AM` form.
pub fn parse_time(input: &str) -> Option<NaiveTime> {
    let input = input.trim();
    TIME_INPUT_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(input, fmt).ok())
}

/// A finite whole float that fits in `i64`, converted without saturation.
pub(crate) fn whole_number(n: f64) -> Option<i64> {
    // i64::MAX as f64 rounds up to 2^63, which is already out of range.
    let in_range = n >= i64::MIN as f64 && n < i64::MAX as f64;
    (n.is_finite() && n.fract() == 0.0 && in_range).then_some(n as i64)
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn format_time(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).expect("valid time")
    }

    #[test]
    fn whole_numbers_stay_in_i64_range() {
        assert_eq!(whole_number(42.0), Some(42));
        assert_eq!(whole_number(-9.0e18), Some(-9_000_000_000_000_000_000));
        assert_eq!(whole_number(i64::MIN as f64), Some(i64::MIN));
        assert_eq!(whole_number(9.3e18), None);
        assert_eq!(whole_number(1e300), None);
        assert_eq!(whole_number(-1e300), None);
        assert_eq!(whole_number(4.5), None);
        assert_eq!(whole_number(f64::NAN), None);
    }

    #[test]
    fn parses_twelve_hour_times() {
        assert_eq!(parse_time("08:00 AM"), Some(hm(8, 0)));
        assert_eq!(parse_time("05:30 pm"), Some(hm(17, 30)));
        assert_eq!(parse_time("12:00 AM"), Some(hm(0, 0)));
        assert_eq!(parse_time("14:45"), Some(hm(14, 45)));
        assert_eq!(parse_time("quarter past"), None);
        assert_eq!(parse_time(""), None);
    }

    #[test]
    fn parses_dates_and_timestamps() {
        let day = NaiveDate::from_ymd_opt(2001, 9, 11).expect("valid date");
        assert_eq!(parse_date("2001-09-11"), Some(day));
        assert_eq!(parse_date("2001-09-11T08:46:00Z"), Some(day));
        assert_eq!(parse_date("2001-09-11T08:46:00"), Some(day));
        assert_eq!(parse_date("2001-13-40"), None);
        assert_eq!(parse_date("yesterday"), None);
    }

    #[test]
    fn text_form_uses_portal_formats() {
        assert_eq!(FieldValue::from(hm(17, 0)).as_text(), "05:00 PM");
        assert_eq!(FieldValue::from(300.0).as_text(), "300");
        assert_eq!(FieldValue::from(None::<&str>), FieldValue::Absent);
        assert_eq!(FieldValue::from(Some("x")), FieldValue::Text("x".into()));
    }
}
