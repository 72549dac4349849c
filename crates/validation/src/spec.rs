//! JSON wire model for rule descriptors.
//!
//! Descriptors arrive as plain objects such as
//! `{"type": "date", "required": true, "min": "1980-01-01", "max": "today"}`.
//! [`RuleSpec`] is the strict wire struct; [`RuleSpec::into_rule`] turns it into a typed
//! [`Rule`] and rejects unknown kinds and bounds that do not fit the kind.

use crate::rule::{Bounds, DateBound, Rule, RuleKind};
use crate::value::{format_date, format_time, parse_date, parse_time, whole_number};
use crate::{RuleError, RuleResult};
use serde::{Deserialize, Serialize};

/// A bound as written in a descriptor: a number, or a date/time string.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BoundSpec {
    Number(f64),
    Text(String),
}

/// Wire representation of a rule descriptor.
///
/// Accepts both the portal's historical keys (`type`, `regex`, `regexError`, `enum`) and the
/// descriptive ones (`kind`, `pattern`, `patternError`, `allowedValues`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleSpec {
    #[serde(rename = "type", alias = "kind")]
    pub kind: String,

    #[serde(default)]
    pub required: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<BoundSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<BoundSpec>,

    #[serde(
        default,
        rename = "regex",
        alias = "pattern",
        skip_serializing_if = "Option::is_none"
    )]
    pub pattern: Option<String>,

    #[serde(
        default,
        rename = "regexError",
        alias = "patternError",
        skip_serializing_if = "Option::is_none"
    )]
    pub pattern_error: Option<String>,

    #[serde(
        default,
        rename = "enum",
        alias = "allowedValues",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub allowed_values: Vec<String>,
}

impl RuleSpec {
    /// Parse a single descriptor from JSON text.
    ///
    /// Schema errors report the path of the offending key (for example `min`).
    pub fn parse(json: &str) -> RuleResult<Self> {
        let mut deserializer = serde_json::Deserializer::from_str(json);
        serde_path_to_error::deserialize(&mut deserializer).map_err(schema_error)
    }

    /// Parse and convert in one step.
    pub fn parse_rule(json: &str) -> RuleResult<Rule> {
        Self::parse(json)?.into_rule()
    }

    /// Convert into a typed rule.
    ///
    /// # Errors
    ///
    /// - [`RuleError::UnknownKind`] if `type` is not one of integer, float, string, date, time
    /// - [`RuleError::InvalidBound`] if a bound does not fit the kind
    /// - [`RuleError::InvalidPattern`] if the pattern does not compile
    pub fn into_rule(self) -> RuleResult<Rule> {
        let kind = match self.kind.as_str() {
            "integer" => RuleKind::Integer(Bounds {
                min: integer_bound("integer", "min", self.min.as_ref())?,
                max: integer_bound("integer", "max", self.max.as_ref())?,
            }),
            "float" => RuleKind::Float(Bounds {
                min: float_bound("min", self.min.as_ref())?,
                max: float_bound("max", self.max.as_ref())?,
            }),
            "string" => RuleKind::Text(Bounds {
                min: length_bound("min", self.min.as_ref())?,
                max: length_bound("max", self.max.as_ref())?,
            }),
            "date" => RuleKind::Date(Bounds {
                min: date_bound("min", self.min.as_ref())?,
                max: date_bound("max", self.max.as_ref())?,
            }),
            "time" => RuleKind::Time(Bounds {
                min: time_bound("min", self.min.as_ref())?,
                max: time_bound("max", self.max.as_ref())?,
            }),
            other => return Err(RuleError::UnknownKind(other.to_string())),
        };

        let mut rule = Rule::new(kind).allowed_values(self.allowed_values);
        if self.required {
            rule = rule.required();
        }
        if let Some(pattern) = self.pattern {
            rule = rule.pattern(&pattern)?;
        }
        if let Some(message) = self.pattern_error {
            rule = rule.pattern_error(message);
        }
        Ok(rule)
    }
}

impl From<&Rule> for RuleSpec {
    fn from(rule: &Rule) -> Self {
        let (min, max) = match rule.kind() {
            RuleKind::Integer(b) => (
                b.min.map(|n| BoundSpec::Number(n as f64)),
                b.max.map(|n| BoundSpec::Number(n as f64)),
            ),
            RuleKind::Float(b) => (b.min.map(BoundSpec::Number), b.max.map(BoundSpec::Number)),
            RuleKind::Text(b) => (
                b.min.map(|n| BoundSpec::Number(n as f64)),
                b.max.map(|n| BoundSpec::Number(n as f64)),
            ),
            RuleKind::Date(b) => (b.min.map(date_bound_text), b.max.map(date_bound_text)),
            RuleKind::Time(b) => (
                b.min.map(|t| BoundSpec::Text(format_time(t))),
                b.max.map(|t| BoundSpec::Text(format_time(t))),
            ),
        };

        Self {
            kind: rule.kind().name().to_string(),
            required: rule.is_required(),
            min,
            max,
            pattern: rule.regex().map(|r| r.as_str().to_string()),
            pattern_error: rule.pattern_message().map(str::to_string),
            allowed_values: rule.allowed().to_vec(),
        }
    }
}

pub(crate) fn schema_error(err: serde_path_to_error::Error<serde_json::Error>) -> RuleError {
    let path = err.path().to_string();
    let message = err.into_inner().to_string();
    let path = if path.is_empty() || path == "." {
        "<root>".to_string()
    } else {
        path
    };
    RuleError::Schema { path, message }
}

fn date_bound_text(bound: DateBound) -> BoundSpec {
    match bound {
        DateBound::Today => BoundSpec::Text("today".into()),
        DateBound::On(date) => BoundSpec::Text(format_date(date)),
    }
}

fn invalid(kind: &'static str, bound: &'static str, reason: impl Into<String>) -> RuleError {
    RuleError::InvalidBound {
        kind,
        bound,
        reason: reason.into(),
    }
}

fn integer_bound(
    kind: &'static str,
    bound: &'static str,
    spec: Option<&BoundSpec>,
) -> RuleResult<Option<i64>> {
    match spec {
        None => Ok(None),
        Some(BoundSpec::Number(n)) if whole_number(*n).is_some() => Ok(whole_number(*n)),
        Some(other) => Err(invalid(kind, bound, format!("expected a whole number, got {other:?}"))),
    }
}

fn float_bound(bound: &'static str, spec: Option<&BoundSpec>) -> RuleResult<Option<f64>> {
    match spec {
        None => Ok(None),
        Some(BoundSpec::Number(n)) if n.is_finite() => Ok(Some(*n)),
        Some(other) => Err(invalid("float", bound, format!("expected a number, got {other:?}"))),
    }
}

fn length_bound(bound: &'static str, spec: Option<&BoundSpec>) -> RuleResult<Option<usize>> {
    let n = integer_bound("string", bound, spec)?;
    n.map(|n| {
        usize::try_from(n).map_err(|_| invalid("string", bound, "length cannot be negative"))
    })
    .transpose()
}

fn date_bound(bound: &'static str, spec: Option<&BoundSpec>) -> RuleResult<Option<DateBound>> {
    match spec {
        None => Ok(None),
        Some(BoundSpec::Text(text)) if text == "today" => Ok(Some(DateBound::Today)),
        Some(BoundSpec::Text(text)) => parse_date(text)
            .map(|date| Some(DateBound::On(date)))
            .ok_or_else(|| invalid("date", bound, format!("unrecognized date '{text}'"))),
        Some(other) => Err(invalid("date", bound, format!("expected a date, got {other:?}"))),
    }
}

fn time_bound(
    bound: &'static str,
    spec: Option<&BoundSpec>,
) -> RuleResult<Option<chrono::NaiveTime>> {
    match spec {
        None => Ok(None),
        Some(BoundSpec::Text(text)) => parse_time(text)
            .map(Some)
            .ok_or_else(|| invalid("time", bound, format!("unrecognized time '{text}'"))),
        Some(other) => Err(invalid("time", bound, format!("expected a time, got {other:?}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Violation;
    use crate::value::FieldValue;
    use chrono::NaiveDate;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).expect("valid date")
    }

    #[test]
    fn parses_portal_descriptor_keys() {
        let rule = RuleSpec::parse_rule(
            r#"{"type": "string", "required": true, "regex": "^0\\d{9}$",
                "regexError": "Phone number must start with 0 and must contain 10 digits"}"#,
        )
        .expect("descriptor should parse");

        assert!(rule.is_required());
        let verdict = rule.validate_at(&"12345".into(), today());
        assert_eq!(verdict.violation, Some(Violation::PatternMismatch));
        assert!(verdict.message.starts_with("Phone number"));
    }

    #[test]
    fn accepts_descriptive_aliases() {
        let rule = RuleSpec::parse_rule(
            r#"{"kind": "string", "allowedValues": ["male", "female"], "pattern": "^[a-z]+$"}"#,
        )
        .expect("aliases should parse");
        assert_eq!(rule.allowed().len(), 2);
        assert!(rule.regex().is_some());
    }

    #[test]
    fn date_descriptor_understands_today() {
        let rule =
            RuleSpec::parse_rule(r#"{"type": "date", "required": true, "min": "1980-01-01", "max": "today"}"#)
                .expect("descriptor should parse");
        match rule.kind() {
            RuleKind::Date(bounds) => {
                assert_eq!(bounds.max, Some(DateBound::Today));
                assert_eq!(
                    bounds.min,
                    Some(DateBound::On(NaiveDate::from_ymd_opt(1980, 1, 1).expect("valid")))
                );
            }
            other => panic!("expected date rule, got {other:?}"),
        }
    }

    #[test]
    fn null_bounds_mean_unbounded_but_zero_is_kept() {
        let rule = RuleSpec::parse_rule(r#"{"type": "float", "min": 0, "max": null}"#)
            .expect("descriptor should parse");
        assert_eq!(rule.kind(), &RuleKind::Float(Bounds::at_least(0.0)));
        assert_eq!(
            rule.validate_at(&FieldValue::Float(-2.0), today()).violation,
            Some(Violation::BelowMinimum)
        );
    }

    #[test]
    fn unknown_kind_fails_loudly() {
        let err = RuleSpec::parse_rule(r#"{"type": "boolean"}"#).expect_err("should reject kind");
        assert!(matches!(err, RuleError::UnknownKind(kind) if kind == "boolean"));
    }

    #[test]
    fn mismatched_bounds_are_rejected() {
        let err = RuleSpec::parse_rule(r#"{"type": "time", "min": 8}"#).expect_err("number for time");
        assert!(matches!(err, RuleError::InvalidBound { kind: "time", bound: "min", .. }));

        let err = RuleSpec::parse_rule(r#"{"type": "string", "max": -1}"#).expect_err("negative length");
        assert!(matches!(err, RuleError::InvalidBound { kind: "string", bound: "max", .. }));

        let err = RuleSpec::parse_rule(r#"{"type": "integer", "max": 1e300}"#).expect_err("out of range");
        assert!(matches!(err, RuleError::InvalidBound { kind: "integer", bound: "max", .. }));

        let err = RuleSpec::parse_rule(r#"{"type": "date", "max": "someday"}"#).expect_err("bad date");
        assert!(matches!(err, RuleError::InvalidBound { kind: "date", .. }));
    }

    #[test]
    fn schema_errors_name_the_offending_key() {
        let err = RuleSpec::parse(r#"{"type": "string", "required": "yes"}"#).expect_err("wrong type");
        match err {
            RuleError::Schema { path, .. } => assert_eq!(path, "required"),
            other => panic!("expected Schema error, got {other:?}"),
        }

        let err = RuleSpec::parse(r#"{"type": "string", "minimum": 3}"#).expect_err("unknown key");
        assert!(matches!(err, RuleError::Schema { message, .. } if message.contains("minimum")));
    }

    #[test]
    fn rule_renders_back_to_descriptor() {
        let spec = RuleSpec::parse(r#"{"type": "time", "required": true, "min": "08:00 AM", "max": "05:00 PM"}"#)
            .expect("descriptor should parse");
        let rule = spec.clone().into_rule().expect("convert");
        assert_eq!(RuleSpec::from(&rule), spec);
    }
}
