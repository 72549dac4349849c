//! Relay configuration, resolved once at startup.
//!
//! The `*_from_env_value` helpers take the raw variable so callers (and tests) decide where
//! values come from.

use crate::{RelayError, RelayResult};
use std::net::SocketAddr;
use unicare_messaging::{DEFAULT_CAPACITY, DEFAULT_CHANNEL};

pub const DEFAULT_RELAY_ADDR: &str = "0.0.0.0:3000";

#[derive(Clone, Debug)]
pub struct RelayConfig {
    addr: SocketAddr,
    api_key: String,
    channel: String,
    capacity: usize,
}

impl RelayConfig {
    /// Fails when `api_key` is blank.
    pub fn new(
        addr: SocketAddr,
        api_key: impl Into<String>,
        channel: impl Into<String>,
    ) -> RelayResult<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(RelayError::InvalidConfig("relay API key must not be blank".into()));
        }
        Ok(Self {
            addr,
            api_key,
            channel: channel.into(),
            capacity: DEFAULT_CAPACITY,
        })
    }

    pub fn with_capacity(mut self, capacity: usize) -> RelayResult<Self> {
        if capacity == 0 {
            return Err(RelayError::InvalidConfig(
                "channel capacity must be greater than zero".into(),
            ));
        }
        self.capacity = capacity;
        Ok(self)
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Key publishers must send in `x-api-key`.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Reads `UNICARE_RELAY_ADDR`, `UNICARE_RELAY_API_KEY` and `UNICARE_CHANNEL`.
    pub fn from_env() -> RelayResult<Self> {
        Self::from_env_values(
            std::env::var("UNICARE_RELAY_ADDR").ok(),
            std::env::var("UNICARE_RELAY_API_KEY").ok(),
            std::env::var("UNICARE_CHANNEL").ok(),
        )
    }

    pub fn from_env_values(
        addr: Option<String>,
        api_key: Option<String>,
        channel: Option<String>,
    ) -> RelayResult<Self> {
        Self::new(
            addr_from_env_value(addr)?,
            api_key_from_env_value(api_key)?,
            channel_from_env_value(channel),
        )
    }
}

pub fn addr_from_env_value(value: Option<String>) -> RelayResult<SocketAddr> {
    let raw = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_RELAY_ADDR.to_string());
    raw.parse()
        .map_err(|e| RelayError::InvalidConfig(format!("invalid relay address '{raw}': {e}")))
}

/// The key is mandatory; blank counts as unset.
pub fn api_key_from_env_value(value: Option<String>) -> RelayResult<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| RelayError::InvalidConfig("UNICARE_RELAY_API_KEY not set".into()))
}

pub fn channel_from_env_value(value: Option<String>) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_CHANNEL.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_unset() {
        let config = RelayConfig::from_env_values(None, Some("secret".into()), None).expect("config");
        assert_eq!(config.addr().to_string(), DEFAULT_RELAY_ADDR);
        assert_eq!(config.api_key(), "secret");
        assert_eq!(config.channel(), "fcm-channel");
        assert_eq!(config.capacity(), DEFAULT_CAPACITY);
    }

    #[test]
    fn values_are_trimmed() {
        let config = RelayConfig::from_env_values(
            Some(" 127.0.0.1:4000 ".into()),
            Some(" secret ".into()),
            Some("campus".into()),
        )
        .expect("config");
        assert_eq!(config.addr().port(), 4000);
        assert_eq!(config.api_key(), "secret");
        assert_eq!(config.channel(), "campus");
    }

    #[test]
    fn missing_or_blank_key_is_rejected() {
        assert!(matches!(
            RelayConfig::from_env_values(None, None, None),
            Err(RelayError::InvalidConfig(_))
        ));
        assert!(matches!(
            RelayConfig::from_env_values(None, Some("   ".into()), None),
            Err(RelayError::InvalidConfig(_))
        ));
        assert!(RelayConfig::new("127.0.0.1:0".parse().expect("addr"), "", "fcm-channel").is_err());
    }

    #[test]
    fn rejects_bad_address_and_zero_capacity() {
        assert!(matches!(
            addr_from_env_value(Some("localhost".into())),
            Err(RelayError::InvalidConfig(_))
        ));
        let config = RelayConfig::from_env_values(None, Some("secret".into()), None).expect("config");
        assert!(config.with_capacity(0).is_err());
    }
}
