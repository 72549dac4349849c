//! Formatting helpers shared by the screens.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use unicare_validation::value::{format_time, parse_time};

/// Shown when a timestamp cannot be parsed.
pub const UNKNOWN_TIME: &str = "unknown";

const MINUTES_PER_DAY: u32 = 24 * 60;

/// Upper-cases the first character and leaves the rest alone.
pub fn first_letter_uppercase(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Random ASCII letters and digits.
pub fn random_text(length: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

/// Parses an API timestamp: RFC 3339, a naive `YYYY-MM-DDTHH:MM:SS` (taken as UTC), or a
/// bare date (midnight UTC).
pub fn parse_timestamp(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(input, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// "N unit(s) ago" for a past timestamp, or [`UNKNOWN_TIME`].
pub fn date_diff(input: &str) -> String {
    date_diff_at(input, Utc::now())
}

pub fn date_diff_at(input: &str, now: DateTime<Utc>) -> String {
    match parse_timestamp(input) {
        Some(then) => relative((now - then).num_seconds(), "ago"),
        None => UNKNOWN_TIME.to_string(),
    }
}

/// "N unit(s) left" until a future timestamp, or [`UNKNOWN_TIME`].
pub fn time_remaining(input: &str) -> String {
    time_remaining_at(input, Utc::now())
}

pub fn time_remaining_at(input: &str, now: DateTime<Utc>) -> String {
    match parse_timestamp(input) {
        Some(then) => relative((then - now).num_seconds(), "left"),
        None => UNKNOWN_TIME.to_string(),
    }
}

fn relative(seconds: i64, suffix: &str) -> String {
    const MINUTE: i64 = 60;
    const HOUR: i64 = 60 * MINUTE;
    const DAY: i64 = 24 * HOUR;
    const WEEK: i64 = 7 * DAY;

    let (count, unit) = if seconds < MINUTE {
        (seconds, "second")
    } else if seconds < HOUR {
        (seconds / MINUTE, "minute")
    } else if seconds < DAY {
        (seconds / HOUR, "hour")
    } else if seconds < WEEK {
        (seconds / DAY, "day")
    } else {
        (seconds / WEEK, "week")
    };

    let plural = if count == 1 { "" } else { "s" };
    format!("{count} {unit}{plural} {suffix}")
}

/// Minutes after midnight for a wall-clock time such as `08:30 AM`.
pub fn time_to_minutes(input: &str) -> Option<u32> {
    parse_time(input).map(|t| t.hour() * 60 + t.minute())
}

/// `hh:mm AM` for minutes after midnight. Values past a day wrap around.
pub fn minutes_to_time(minutes: u32) -> String {
    let minutes = minutes % MINUTES_PER_DAY;
    NaiveTime::from_hms_opt(minutes / 60, minutes % 60, 0)
        .map(format_time)
        .unwrap_or_default()
}

/// Local `YYYY-MM-DD hh:mm AM` rendering used on appointment and record cards.
pub fn format_local(timestamp: DateTime<Utc>) -> String {
    timestamp
        .with_timezone(&Local)
        .format("%Y-%m-%d %I:%M %p")
        .to_string()
}
