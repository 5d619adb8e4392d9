//! Console configuration.
//!
//! Defaults are usable as-is for a local backend; every field can be overridden
//! from the environment.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use stockroom_observability::{LogConfig, LogFormat};

use crate::session::DEFAULT_INACTIVITY_TIMEOUT;

pub const ENV_API_URL: &str = "STOCKROOM_API_URL";
pub const ENV_INACTIVITY_TIMEOUT: &str = "STOCKROOM_INACTIVITY_TIMEOUT_SECS";
pub const ENV_SESSION_CHECK_INTERVAL: &str = "STOCKROOM_SESSION_CHECK_INTERVAL_SECS";
pub const ENV_CREDENTIALS_PATH: &str = "STOCKROOM_CREDENTIALS_PATH";
pub const ENV_LOG_LEVEL: &str = "STOCKROOM_LOG_LEVEL";
pub const ENV_LOG_FORMAT: &str = "STOCKROOM_LOG_FORMAT";

const DEFAULT_API_URL: &str = "http://localhost:8080";
const DEFAULT_SESSION_CHECK_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleConfig {
    /// Base URL of the backend REST API.
    pub api_url: String,

    /// Idle time after which the session is signed out.
    pub inactivity_timeout: Duration,

    /// How often the watchdog calls `check_session`.
    pub session_check_interval: Duration,

    /// Where the token bundle is persisted.
    pub credentials_path: PathBuf,

    pub log: LogConfig,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var}: expected a whole number of seconds, got '{value}'")]
    InvalidSeconds { var: &'static str, value: String },

    #[error("{var} must be greater than zero")]
    ZeroDuration { var: &'static str },

    #[error("{var} must not be empty")]
    Empty { var: &'static str },

    #[error("{var}: {message}")]
    Invalid { var: &'static str, message: String },
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            inactivity_timeout: DEFAULT_INACTIVITY_TIMEOUT,
            session_check_interval: DEFAULT_SESSION_CHECK_INTERVAL,
            credentials_path: default_credentials_path(),
            log: LogConfig::default(),
        }
    }
}

/// `<data dir>/stockroom/credentials.json`, or the working directory when the
/// platform has no data dir.
pub fn default_credentials_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("stockroom")
        .join("credentials.json")
}

impl ConsoleConfig {
    /// Defaults overridden by the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_API_URL) {
            let url = url.trim();
            if url.is_empty() {
                return Err(ConfigError::Empty { var: ENV_API_URL });
            }
            config.api_url = url.to_string();
        }

        if let Some(raw) = lookup(ENV_INACTIVITY_TIMEOUT) {
            config.inactivity_timeout = parse_seconds(ENV_INACTIVITY_TIMEOUT, &raw)?;
        }

        if let Some(raw) = lookup(ENV_SESSION_CHECK_INTERVAL) {
            config.session_check_interval = parse_seconds(ENV_SESSION_CHECK_INTERVAL, &raw)?;
        }

        if let Some(path) = lookup(ENV_CREDENTIALS_PATH) {
            if path.trim().is_empty() {
                return Err(ConfigError::Empty {
                    var: ENV_CREDENTIALS_PATH,
                });
            }
            config.credentials_path = PathBuf::from(path);
        }

        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            config.log.level = level;
        }

        if let Some(format) = lookup(ENV_LOG_FORMAT) {
            config.log.format = format
                .parse::<LogFormat>()
                .map_err(|e| ConfigError::Invalid {
                    var: ENV_LOG_FORMAT,
                    message: e.to_string(),
                })?;
        }

        Ok(config)
    }
}

fn parse_seconds(var: &'static str, raw: &str) -> Result<Duration, ConfigError> {
    let secs: u64 = raw.trim().parse().map_err(|_| ConfigError::InvalidSeconds {
        var,
        value: raw.to_string(),
    })?;
    if secs == 0 {
        return Err(ConfigError::ZeroDuration { var });
    }
    Ok(Duration::from_secs(secs))
}
