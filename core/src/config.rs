//! Client configuration: where the API lives and how long to wait for it.

use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:4000";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub const BASE_URL_VAR: &str = "CONTACTS_API_URL";
pub const TIMEOUT_VAR: &str = "CONTACTS_API_TIMEOUT_SECS";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be a whole number of seconds, got {value:?}")]
    InvalidTimeout { var: &'static str, value: String },

    #[error("{var} must not be empty")]
    EmptyBaseUrl { var: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    base_url: String,
    pub timeout: Duration,
}

impl Config {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Read `CONTACTS_API_URL` and `CONTACTS_API_TIMEOUT_SECS`, falling back
    /// to the defaults for unset variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = match lookup(BASE_URL_VAR) {
            Some(url) if url.trim().is_empty() => {
                return Err(ConfigError::EmptyBaseUrl { var: BASE_URL_VAR })
            }
            Some(url) => url,
            None => DEFAULT_BASE_URL.to_string(),
        };

        let timeout = match lookup(TIMEOUT_VAR) {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| ConfigError::InvalidTimeout {
                    var: TIMEOUT_VAR,
                    value: raw,
                })?,
            None => DEFAULT_TIMEOUT,
        };

        Ok(Self::new(base_url.trim()).with_timeout(timeout))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}
