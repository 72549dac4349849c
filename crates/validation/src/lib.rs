//! # UniCare Validation
//!
//! Declarative field rules and the engine that evaluates them.
//!
//! Every portal form (signup, login, profile edit, appointment requests, time-slot
//! creation) describes its fields with a [`Rule`] and checks candidate values with
//! [`validate`]. The engine is pure: it performs no I/O, holds no state and always returns
//! a [`Verdict`] carrying exactly one human-readable message.
//!
//! This crate contains:
//! - [`rule`]: the typed rule descriptor (`Rule`, `RuleKind`, `Bounds`, `DateBound`)
//! - [`value`]: candidate values and the clock/date parsers used to coerce form text
//! - [`engine`]: the fixed-order check pipeline
//! - [`spec`]: the JSON descriptor wire model and its strict conversion into a `Rule`
//! - [`form`]: whole-form validation producing per-field errors
//! - [`presets`]: the portal's rule tables

pub mod engine;
pub mod form;
pub mod presets;
pub mod rule;
pub mod spec;
pub mod value;

pub use engine::{validate, validate_at, Verdict, Violation};
pub use form::{form_values, FieldError, FormReport, FormRules, FormValues};
pub use rule::{Bounds, DateBound, Rule, RuleKind};
pub use spec::{BoundSpec, RuleSpec};
pub use value::FieldValue;

/// Errors raised while building a rule descriptor.
///
/// Validation itself never fails; these only surface when a descriptor is malformed.
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    #[error("unknown rule kind: {0}")]
    UnknownKind(String),

    #[error("invalid {bound} bound for {kind} rule: {reason}")]
    InvalidBound {
        kind: &'static str,
        bound: &'static str,
        reason: String,
    },

    #[error("invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("rule descriptor schema mismatch at {path}: {message}")]
    Schema { path: String, message: String },
}

/// Type alias for Results that can fail with a [`RuleError`].
pub type RuleResult<T> = Result<T, RuleError>;
