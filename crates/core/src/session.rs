//! Session flags: the auth token, the logged-in role and the theme preference.
//!
//! A [`Session`] is explicit state owned by the caller and handed to the client. The
//! [`SessionStore`] persists it between runs as a small JSON file.

use crate::{PortalError, PortalResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use unicare_types::{Role, ThemeMode};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logged_in_as: Option<Role>,
    #[serde(default)]
    pub theme: ThemeMode,
}

impl Session {
    pub fn is_logged_in(&self) -> bool {
        self.token.is_some()
    }

    pub fn log_in(&mut self, token: impl Into<String>, role: Role) {
        self.token = Some(token.into());
        self.logged_in_as = Some(role);
    }

    /// Clears the token and role. The theme preference is kept.
    pub fn log_out(&mut self) {
        self.token = None;
        self.logged_in_as = None;
    }

    /// The logged-in role, or [`PortalError::NotLoggedIn`].
    pub fn role(&self) -> PortalResult<Role> {
        match (&self.token, self.logged_in_as) {
            (Some(_), Some(role)) => Ok(role),
            _ => Err(PortalError::NotLoggedIn),
        }
    }
}

/// JSON-file persistence for [`Session`].
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the stored session. A missing file is an empty session.
    pub fn load(&self) -> PortalResult<Session> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Session::default()),
            Err(e) => return Err(PortalError::SessionRead(e)),
        };
        serde_json::from_str(&text).map_err(PortalError::Deserialization)
    }

    pub fn save(&self, session: &Session) -> PortalResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(PortalError::SessionDirCreation)?;
        }
        let json = serde_json::to_string_pretty(session).map_err(PortalError::Serialization)?;
        fs::write(&self.path, json).map_err(PortalError::SessionWrite)?;
        tracing::debug!(path = %self.path.display(), "session saved");
        Ok(())
    }

    /// Loads, applies `change`, and saves.
    pub fn update(&self, change: impl FnOnce(&mut Session)) -> PortalResult<Session> {
        let mut session = self.load()?;
        change(&mut session);
        self.save(&session)?;
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_is_an_empty_session() {
        let temp = TempDir::new().expect("temp dir");
        let store = SessionStore::new(temp.path().join("session.json"));
        let session = store.load().expect("load");
        assert_eq!(session, Session::default());
        assert!(!session.is_logged_in());
        assert!(matches!(session.role(), Err(PortalError::NotLoggedIn)));
    }

    #[test]
    fn save_creates_directory_and_round_trips() {
        let temp = TempDir::new().expect("temp dir");
        let store = SessionStore::new(temp.path().join("nested").join("session.json"));

        let mut session = Session::default();
        session.log_in("tok-123", Role::MedicalCentre);
        session.theme = ThemeMode::Dark;
        store.save(&session).expect("save");

        let loaded = store.load().expect("load");
        assert_eq!(loaded, session);
        assert_eq!(loaded.role().expect("role"), Role::MedicalCentre);
    }

    #[test]
    fn logout_keeps_theme() {
        let temp = TempDir::new().expect("temp dir");
        let store = SessionStore::new(temp.path().join("session.json"));

        store
            .update(|s| {
                s.log_in("tok", Role::Student);
                s.theme = ThemeMode::Dark;
            })
            .expect("login");
        let after = store.update(Session::log_out).expect("logout");

        assert!(after.token.is_none());
        assert!(after.logged_in_as.is_none());
        assert_eq!(after.theme, ThemeMode::Dark);
    }

    #[test]
    fn corrupt_file_is_reported() {
        let temp = TempDir::new().expect("temp dir");
        let path = temp.path().join("session.json");
        fs::write(&path, "{not json").expect("write");
        let err = SessionStore::new(path).load().expect_err("should fail");
        assert!(matches!(err, PortalError::Deserialization(_)));
    }
}
