//! Server configuration from environment variables. The binary loads `.env` (dotenvy) before reading.

use crate::models::is_valid_capacity;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, Eq, PartialEq)]
pub enum ConfigError {
    #[error("{key} has invalid value {value:?}")]
    InvalidValue { key: &'static str, value: String },
}

/// Settings for the `web` binary.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory with the built single-page client.
    pub static_dir: PathBuf,
    /// Tournaments untouched for this long are dropped. `None` disables cleanup.
    pub inactivity_timeout: Option<Duration>,
    /// Pool size used when a create request does not give one.
    pub default_max_participants: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            static_dir: PathBuf::from("static"),
            inactivity_timeout: Some(Duration::from_secs(72 * 3600)),
            default_max_participants: 8,
        }
    }
}

impl ServerConfig {
    /// Read HOST, PORT, STATIC_DIR, INACTIVITY_TIMEOUT_HOURS and DEFAULT_MAX_PARTICIPANTS.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(host) = lookup("HOST") {
            config.host = host;
        }
        if let Some(port) = lookup("PORT") {
            config.port = parse("PORT", port)?;
        }
        if let Some(dir) = lookup("STATIC_DIR") {
            config.static_dir = PathBuf::from(dir);
        }
        if let Some(hours) = lookup("INACTIVITY_TIMEOUT_HOURS") {
            let secs = parse::<u64>("INACTIVITY_TIMEOUT_HOURS", hours.clone())?
                .checked_mul(3600)
                .ok_or(ConfigError::InvalidValue {
                    key: "INACTIVITY_TIMEOUT_HOURS",
                    value: hours,
                })?;
            config.inactivity_timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }
        if let Some(n) = lookup("DEFAULT_MAX_PARTICIPANTS") {
            let max: usize = parse("DEFAULT_MAX_PARTICIPANTS", n.clone())?;
            if !is_valid_capacity(max) {
                return Err(ConfigError::InvalidValue {
                    key: "DEFAULT_MAX_PARTICIPANTS",
                    value: n,
                });
            }
            config.default_max_participants = max;
        }
        Ok(config)
    }
}

fn parse<T: std::str::FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue { key, value })
}
