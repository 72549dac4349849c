use crate::constants::NO_AUTH_STATUS;
use serde::{Deserialize, Serialize};
use std::fmt;
use unicare_validation::FormReport;

pub const NETWORK_ERROR_MESSAGE: &str = "Please check your internet connection and try again.";
pub const TIMEOUT_ERROR_MESSAGE: &str = "Request timeout, try again.";
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong.";

/// A failed API call, normalised to the `{status, message}` shape the screens display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub status: String,
    pub message: String,
}

impl ApiError {
    pub fn new(status: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            message: message.into(),
        }
    }

    /// Connection could not be established.
    pub fn network() -> Self {
        Self::new("error", NETWORK_ERROR_MESSAGE)
    }

    pub fn timeout() -> Self {
        Self::new("error", TIMEOUT_ERROR_MESSAGE)
    }

    /// Anything without a more specific description.
    pub fn generic() -> Self {
        Self::new("error", GENERIC_ERROR_MESSAGE)
    }

    /// The token is missing or expired and the user has to log in again.
    pub fn is_no_auth(&self) -> bool {
        self.status == NO_AUTH_STATUS
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.status)
    }
}

impl std::error::Error for ApiError {}

#[derive(Debug, thiserror::Error)]
pub enum PortalError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("{0}")]
    Api(#[from] ApiError),
    #[error("validation failed: {0}")]
    Validation(#[from] FormReport),
    #[error("not logged in")]
    NotLoggedIn,
    #[error("failed to create session directory: {0}")]
    SessionDirCreation(std::io::Error),
    #[error("failed to read session file: {0}")]
    SessionRead(std::io::Error),
    #[error("failed to write session file: {0}")]
    SessionWrite(std::io::Error),
    #[error("failed to read upload file: {0}")]
    FileRead(std::io::Error),
    #[error("failed to serialize: {0}")]
    Serialization(serde_json::Error),
    #[error("failed to deserialize: {0}")]
    Deserialization(serde_json::Error),
}

impl PortalError {
    /// Whether the user must log in again before retrying.
    pub fn needs_login(&self) -> bool {
        match self {
            Self::Api(err) => err.is_no_auth(),
            Self::NotLoggedIn => true,
            _ => false,
        }
    }
}

pub type PortalResult<T> = std::result::Result<T, PortalError>;
