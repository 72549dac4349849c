//! Whole-form validation.
//!
//! A [`FormRules`] table lists a form's fields in display order. Screens validate one field
//! on every change ([`FormRules::validate_field`]) and the whole form, or one step of a
//! multi-step form, before submitting ([`FormRules::validate`],
//! [`FormRules::validate_fields`]).

use crate::engine::{validate_at, Verdict, Violation};
use crate::rule::Rule;
use crate::spec::{schema_error, RuleSpec};
use crate::value::FieldValue;
use crate::RuleResult;
use chrono::{Local, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Submitted values keyed by field name. Missing keys are absent values.
pub type FormValues = BTreeMap<String, FieldValue>;

/// Builds [`FormValues`] from `(name, value)` pairs.
pub fn form_values<I, K, V>(pairs: I) -> FormValues
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<FieldValue>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// Ordered rule table for one form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormRules {
    fields: Vec<(String, Rule)>,
}

impl FormRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a field, replacing any earlier rule with the same name.
    pub fn field(mut self, name: impl Into<String>, rule: Rule) -> Self {
        let name = name.into();
        self.fields.retain(|(existing, _)| *existing != name);
        self.fields.push((name, rule));
        self
    }

    pub fn get(&self, name: &str) -> Option<&Rule> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, rule)| rule)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fields `start..start + count` in declaration order, for step-wise forms.
    pub fn slice(&self, start: usize, count: usize) -> Self {
        Self {
            fields: self.fields.iter().skip(start).take(count).cloned().collect(),
        }
    }

    /// Validates a single changed field. Fields without a rule yield `None`.
    pub fn validate_field(&self, name: &str, value: &FieldValue) -> Option<Verdict> {
        self.validate_field_at(name, value, Local::now().date_naive())
    }

    pub fn validate_field_at(
        &self,
        name: &str,
        value: &FieldValue,
        today: NaiveDate,
    ) -> Option<Verdict> {
        self.get(name).map(|rule| validate_at(rule, value, today))
    }

    /// Validates every field of the form.
    pub fn validate(&self, values: &FormValues) -> FormReport {
        self.validate_at(values, Local::now().date_naive())
    }

    pub fn validate_at(&self, values: &FormValues, today: NaiveDate) -> FormReport {
        let absent = FieldValue::Absent;
        let mut report = FormReport::default();

        for (name, rule) in &self.fields {
            let value = values.get(name).unwrap_or(&absent);
            let verdict = validate_at(rule, value, today);
            if !verdict.valid {
                report.push(name, verdict);
            }
        }

        tracing::debug!(
            fields = self.fields.len(),
            errors = report.errors.len(),
            "validated form"
        );
        report
    }

    /// Validates only the named fields, in declaration order. Unknown names are ignored.
    pub fn validate_fields(&self, names: &[&str], values: &FormValues) -> FormReport {
        self.validate_fields_at(names, values, Local::now().date_naive())
    }

    pub fn validate_fields_at(
        &self,
        names: &[&str],
        values: &FormValues,
        today: NaiveDate,
    ) -> FormReport {
        let subset = Self {
            fields: self
                .fields
                .iter()
                .filter(|(name, _)| names.contains(&name.as_str()))
                .cloned()
                .collect(),
        };
        subset.validate_at(values, today)
    }

    /// Parses a form table from a JSON object of descriptors, keeping key order.
    pub fn from_json(json: &str) -> RuleResult<Self> {
        let mut deserializer = serde_json::Deserializer::from_str(json);
        let specs: serde_json::Map<String, serde_json::Value> =
            serde_path_to_error::deserialize(&mut deserializer).map_err(schema_error)?;

        let mut form = Self::new();
        for (name, value) in specs {
            let spec: RuleSpec = serde_path_to_error::deserialize(value).map_err(|err| {
                let path = err.path().to_string();
                crate::RuleError::Schema {
                    path: if path.is_empty() || path == "." {
                        name.clone()
                    } else {
                        format!("{name}.{path}")
                    },
                    message: err.into_inner().to_string(),
                }
            })?;
            form = form.field(name, spec.into_rule()?);
        }
        Ok(form)
    }

    /// Renders the table as descriptor JSON, field order preserved.
    pub fn to_json(&self) -> serde_json::Value {
        let map = self
            .fields
            .iter()
            .map(|(name, rule)| {
                let spec = RuleSpec::from(rule);
                let value = serde_json::to_value(spec).unwrap_or(serde_json::Value::Null);
                (name.clone(), value)
            })
            .collect::<serde_json::Map<_, _>>();
        serde_json::Value::Object(map)
    }
}

/// A failing field and the message to show beside it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub violation: Option<Violation>,
}

/// Per-field errors for one submission, in form order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FormReport {
    errors: Vec<FieldError>,
}

impl FormReport {
    fn push(&mut self, field: &str, verdict: Verdict) {
        self.errors.push(FieldError {
            field: field.to_string(),
            message: verdict.message,
            violation: verdict.violation,
        });
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn error_for(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    /// Adds a mismatch error on `field` when the two entries differ and `field` has no
    /// error yet.
    pub fn require_match(
        mut self,
        field: &str,
        first: &str,
        second: &str,
        message: impl Into<String>,
    ) -> Self {
        if first != second && self.error_for(field).is_none() {
            self.errors.push(FieldError {
                field: field.to_string(),
                message: message.into(),
                violation: None,
            });
        }
        self
    }

    /// `Ok(())` when every field passed, otherwise the report itself.
    pub fn into_result(self) -> Result<(), FormReport> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FormReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for error in &self.errors {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", error.field, error.message)?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for FormReport {}
