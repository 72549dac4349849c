//! Shared primitives for the UniCare portal crates.
//!
//! - [`NonEmptyText`] for message bodies and display names that must carry content
//! - [`Role`] for the two portal audiences and their wire spelling
//! - [`ThemeMode`] for the persisted light/dark preference

use std::fmt;
use std::str::FromStr;

/// Errors raised while constructing the shared primitives.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,
    /// The input did not name a known portal role
    #[error("unknown role: {0}")]
    UnknownRole(String),
    /// The input did not name a known theme
    #[error("unknown theme: {0}")]
    UnknownTheme(String),
}

/// Trimmed text with at least one non-whitespace character.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Trims `input` and rejects it when nothing is left.
    ///
    /// # Errors
    ///
    /// Returns [`TextError::Empty`] for empty or whitespace-only input.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NonEmptyText::new(&s).map_err(serde::de::Error::custom)
    }
}

/// The two audiences of the portal.
///
/// On the wire (push payloads, stored flags) these are spelled `student` and
/// `medical-centre`. `doctor` is accepted as an alias for the medical centre because the
/// login flow stores that spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Role {
    #[serde(rename = "student")]
    Student,
    #[serde(rename = "medical-centre", alias = "doctor")]
    MedicalCentre,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::MedicalCentre => "medical-centre",
        }
    }

    /// The conversation partner of this role.
    pub fn counterpart(&self) -> Self {
        match self {
            Self::Student => Self::MedicalCentre,
            Self::MedicalCentre => Self::Student,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = TextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "student" => Ok(Self::Student),
            "medical-centre" | "doctor" => Ok(Self::MedicalCentre),
            other => Err(TextError::UnknownRole(other.to_string())),
        }
    }
}

/// Persisted colour scheme preference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

impl ThemeMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    pub fn is_dark(self) -> bool {
        matches!(self, Self::Dark)
    }
}

impl FromStr for ThemeMode {
    type Err = TextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(TextError::UnknownTheme(other.to_string())),
        }
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Light => "light",
            Self::Dark => "dark",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_empty_text_trims_and_rejects_blank() {
        let text = NonEmptyText::new("  chest pain  ").expect("should accept text");
        assert_eq!(text.as_str(), "chest pain");
        assert_eq!(NonEmptyText::new("   "), Err(TextError::Empty));
    }

    #[test]
    fn role_uses_portal_wire_spelling() {
        let json = serde_json::to_string(&Role::MedicalCentre).expect("serialise");
        assert_eq!(json, "\"medical-centre\"");

        let parsed: Role = serde_json::from_str("\"doctor\"").expect("alias");
        assert_eq!(parsed, Role::MedicalCentre);
        assert_eq!("Student".parse::<Role>(), Ok(Role::Student));
        assert!(matches!("nurse".parse::<Role>(), Err(TextError::UnknownRole(r)) if r == "nurse"));
    }

    #[test]
    fn role_counterpart_flips() {
        assert_eq!(Role::Student.counterpart(), Role::MedicalCentre);
        assert_eq!(Role::MedicalCentre.counterpart(), Role::Student);
    }

    #[test]
    fn theme_toggles() {
        assert_eq!(ThemeMode::default(), ThemeMode::Light);
        assert!(ThemeMode::Light.toggled().is_dark());
        assert_eq!("DARK".parse::<ThemeMode>(), Ok(ThemeMode::Dark));
    }
}
