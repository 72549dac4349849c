//! Typed rule descriptors.
//!
//! A [`Rule`] describes the constraints on one form field. The comparison semantics are
//! selected by [`RuleKind`], and each kind carries bounds of its own type: numeric bounds
//! for numbers, character counts for text, calendar days for dates and wall-clock times
//! for times. An absent bound means unbounded; `0` is a real bound.

use crate::engine::{self, Verdict};
use crate::value::{format_date, FieldValue};
use crate::RuleResult;
use chrono::{NaiveDate, NaiveTime};
use regex::Regex;
use std::fmt;

/// Inclusive lower and upper limits. `None` means no limit on that side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds<T> {
    pub min: Option<T>,
    pub max: Option<T>,
}

impl<T> Bounds<T> {
    pub const fn unbounded() -> Self {
        Self {
            min: None,
            max: None,
        }
    }

    pub const fn at_least(min: T) -> Self {
        Self {
            min: Some(min),
            max: None,
        }
    }

    pub const fn at_most(max: T) -> Self {
        Self {
            min: None,
            max: Some(max),
        }
    }

    pub const fn between(min: T, max: T) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }
}

impl<T> Default for Bounds<T> {
    fn default() -> Self {
        Self::unbounded()
    }
}

/// A chronological bound for date rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateBound {
    /// Resolved to the current calendar day when the rule is evaluated.
    Today,
    /// A fixed calendar day.
    On(NaiveDate),
}

impl DateBound {
    pub fn resolve(self, today: NaiveDate) -> NaiveDate {
        match self {
            Self::Today => today,
            Self::On(date) => date,
        }
    }
}

impl fmt::Display for DateBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Today => f.write_str("today"),
            Self::On(date) => f.write_str(&format_date(*date)),
        }
    }
}

/// Comparison semantics of a rule, each variant carrying its own bound type.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleKind {
    Integer(Bounds<i64>),
    Float(Bounds<f64>),
    /// Bounds are character counts.
    Text(Bounds<usize>),
    Date(Bounds<DateBound>),
    /// Bounds are wall-clock times, compared within a single day.
    Time(Bounds<NaiveTime>),
}

impl RuleKind {
    /// The descriptor spelling of this kind.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::Text(_) => "string",
            Self::Date(_) => "date",
            Self::Time(_) => "time",
        }
    }
}

/// Constraints for a single field.
///
/// Defaults: not required, no pattern, no pattern message, no allowed-value set.
#[derive(Debug, Clone)]
pub struct Rule {
    kind: RuleKind,
    required: bool,
    pattern: Option<Regex>,
    pattern_error: Option<String>,
    allowed_values: Vec<String>,
}

impl Rule {
    pub fn new(kind: RuleKind) -> Self {
        Self {
            kind,
            required: false,
            pattern: None,
            pattern_error: None,
            allowed_values: Vec::new(),
        }
    }

    pub fn integer(bounds: Bounds<i64>) -> Self {
        Self::new(RuleKind::Integer(bounds))
    }

    pub fn float(bounds: Bounds<f64>) -> Self {
        Self::new(RuleKind::Float(bounds))
    }

    /// A text rule whose bounds are minimum and maximum character counts.
    pub fn text(bounds: Bounds<usize>) -> Self {
        Self::new(RuleKind::Text(bounds))
    }

    pub fn date(bounds: Bounds<DateBound>) -> Self {
        Self::new(RuleKind::Date(bounds))
    }

    pub fn time(bounds: Bounds<NaiveTime>) -> Self {
        Self::new(RuleKind::Time(bounds))
    }

    /// Marks the field as required: an empty value is then a violation.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Compiles `pattern` and requires the value's string form to match it.
    ///
    /// # Errors
    ///
    /// Returns [`crate::RuleError::InvalidPattern`] if the expression does not compile.
    pub fn pattern(self, pattern: &str) -> RuleResult<Self> {
        Ok(self.with_regex(Regex::new(pattern)?))
    }

    pub fn with_regex(mut self, regex: Regex) -> Self {
        self.pattern = Some(regex);
        self
    }

    /// Message reported instead of the generic format error when the pattern fails.
    pub fn pattern_error(mut self, message: impl Into<String>) -> Self {
        self.pattern_error = Some(message.into());
        self
    }

    pub fn allowed_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_values = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn kind(&self) -> &RuleKind {
        &self.kind
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn regex(&self) -> Option<&Regex> {
        self.pattern.as_ref()
    }

    pub fn pattern_message(&self) -> Option<&str> {
        self.pattern_error.as_deref()
    }

    pub fn allowed(&self) -> &[String] {
        &self.allowed_values
    }

    /// Checks `value` against this rule using the local calendar day for `"today"`.
    pub fn validate(&self, value: &FieldValue) -> Verdict {
        engine::validate(self, value)
    }

    pub fn validate_at(&self, value: &FieldValue, today: NaiveDate) -> Verdict {
        engine::validate_at(self, value, today)
    }
}

impl PartialEq for Rule {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.required == other.required
            && self.pattern.as_ref().map(Regex::as_str) == other.pattern.as_ref().map(Regex::as_str)
            && self.pattern_error == other.pattern_error
            && self.allowed_values == other.allowed_values
    }
}
