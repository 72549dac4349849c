//! Portal client configuration.
//!
//! Configuration is resolved once at process startup and then passed into the client and
//! services. Nothing in this crate reads environment variables while handling a request;
//! binaries read them and hand the raw values to the `*_from_env_value` helpers below.

use crate::constants::{
    DEFAULT_API_URL, DEFAULT_TIMEOUT_SECS, SESSION_DIR_NAME, SESSION_FILE_NAME,
};
use crate::{PortalError, PortalResult};
use reqwest::Url;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Client configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct PortalConfig {
    base_url: Url,
    request_timeout: Duration,
    user_agent: String,
    session_dir: PathBuf,
}

impl PortalConfig {
    /// Create a new `PortalConfig`.
    ///
    /// The base URL must be http(s). A missing trailing slash is added so that endpoint
    /// paths join beneath it.
    pub fn new(
        base_url: &str,
        request_timeout: Duration,
        session_dir: PathBuf,
    ) -> PortalResult<Self> {
        let base_url = parse_base_url(base_url)?;
        if request_timeout.is_zero() {
            return Err(PortalError::InvalidInput(
                "request timeout must be greater than zero".into(),
            ));
        }

        Ok(Self {
            base_url,
            request_timeout,
            user_agent: format!("unicare/{}", env!("CARGO_PKG_VERSION")),
            session_dir,
        })
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn session_dir(&self) -> &Path {
        &self.session_dir
    }

    pub fn session_file(&self) -> PathBuf {
        self.session_dir.join(SESSION_FILE_NAME)
    }
}

fn parse_base_url(value: &str) -> PortalResult<Url> {
    let mut value = value.trim().to_string();
    if !value.ends_with('/') {
        value.push('/');
    }
    let url = Url::parse(&value)
        .map_err(|e| PortalError::InvalidInput(format!("invalid API base URL '{value}': {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(PortalError::InvalidInput(format!(
            "API base URL must use http or https, got '{other}'"
        ))),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Resolve the API base URL from an optional environment value.
pub fn base_url_from_env_value(value: Option<String>) -> String {
    non_blank(value).unwrap_or_else(|| DEFAULT_API_URL.to_string())
}

/// Parse the request timeout (whole seconds) from an optional environment value.
pub fn timeout_from_env_value(value: Option<String>) -> PortalResult<Duration> {
    let secs = non_blank(value)
        .map(|v| {
            v.parse::<u64>().map_err(|_| {
                PortalError::InvalidInput(format!("timeout must be whole seconds, got '{v}'"))
            })
        })
        .transpose()?
        .unwrap_or(DEFAULT_TIMEOUT_SECS);

    if secs == 0 {
        return Err(PortalError::InvalidInput(
            "timeout must be greater than zero".into(),
        ));
    }
    Ok(Duration::from_secs(secs))
}

/// Resolve the session directory: an explicit override, else `.unicare` under `home`.
pub fn session_dir_from_env_values(
    override_dir: Option<String>,
    home: Option<PathBuf>,
) -> PortalResult<PathBuf> {
    if let Some(dir) = non_blank(override_dir) {
        return Ok(PathBuf::from(dir));
    }
    home.map(|home| home.join(SESSION_DIR_NAME)).ok_or_else(|| {
        PortalError::InvalidInput(
            "cannot locate a home directory; set UNICARE_HOME to choose where the session is kept"
                .into(),
        )
    })
}

/// Build a [`PortalConfig`] from raw environment values.
pub fn from_env_values(
    api_url: Option<String>,
    timeout_secs: Option<String>,
    session_dir: Option<String>,
    home: Option<PathBuf>,
) -> PortalResult<PortalConfig> {
    PortalConfig::new(
        &base_url_from_env_value(api_url),
        timeout_from_env_value(timeout_secs)?,
        session_dir_from_env_values(session_dir, home)?,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_values_are_missing_or_blank() {
        let cfg = from_env_values(None, Some("  ".into()), None, Some(PathBuf::from("/home/kamal")))
            .expect("defaults should resolve");
        assert_eq!(cfg.base_url().as_str(), DEFAULT_API_URL);
        assert_eq!(cfg.request_timeout(), Duration::from_secs(30));
        assert_eq!(cfg.session_file(), PathBuf::from("/home/kamal/.unicare/session.json"));
    }

    #[test]
    fn base_url_gains_trailing_slash() {
        let cfg = PortalConfig::new("https://unicare.example/api", Duration::from_secs(5), PathBuf::from("s"))
            .expect("valid config");
        assert_eq!(
            cfg.base_url().join("doctors/login").expect("join").as_str(),
            "https://unicare.example/api/doctors/login"
        );
    }

    #[test]
    fn rejects_bad_values() {
        assert!(timeout_from_env_value(Some("soon".into())).is_err());
        assert!(timeout_from_env_value(Some("0".into())).is_err());
        assert!(PortalConfig::new("ftp://files", Duration::from_secs(5), PathBuf::from("s")).is_err());
        assert!(PortalConfig::new("not a url", Duration::from_secs(5), PathBuf::from("s")).is_err());
        assert!(session_dir_from_env_values(None, None).is_err());
    }

    #[test]
    fn explicit_session_dir_wins() {
        let dir = session_dir_from_env_values(Some("/tmp/unicare".into()), Some(PathBuf::from("/home/x")))
            .expect("override");
        assert_eq!(dir, PathBuf::from("/tmp/unicare"));
    }
}
