//! Client configuration: default headers and the transport timeout.

use std::env::VarError;
use std::time::Duration;

use crate::error::ConfigError;

pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Environment variable holding the transport timeout in whole seconds.
pub const TIMEOUT_ENV_VAR: &str = "REQUEST_TIMEOUT_SECS";

/// Configuration for `Client`.
///
/// `default_headers` are merged into every request after the caller's
/// headers, and only for names the caller did not set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub default_headers: Vec<(String, String)>,
    /// Global timeout handed to the transport. `None` means a blocking call
    /// waits for as long as the transport takes.
    pub timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            default_headers: vec![
                ("Accept".to_string(), JSON_CONTENT_TYPE.to_string()),
                ("Content-Type".to_string(), JSON_CONTENT_TYPE.to_string()),
            ],
            timeout: None,
        }
    }
}

impl ClientConfig {
    /// Add or replace a default header.
    pub fn with_default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.default_headers
            .retain(|(existing, _)| !existing.eq_ignore_ascii_case(&name));
        self.default_headers.push((name, value.into()));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Create configuration from environment variables.
    ///
    /// Reads `REQUEST_TIMEOUT_SECS` (optional). Everything else uses the
    /// defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_timeout_var(std::env::var(TIMEOUT_ENV_VAR))
    }

    fn from_timeout_var(raw: Result<String, VarError>) -> Result<Self, ConfigError> {
        let config = Self::default();
        let raw = match raw {
            Ok(raw) => raw,
            Err(VarError::NotPresent) => return Ok(config),
            Err(VarError::NotUnicode(value)) => {
                return Err(ConfigError::InvalidValue {
                    var: TIMEOUT_ENV_VAR,
                    value: value.to_string_lossy().into_owned(),
                })
            }
        };
        let secs = raw.trim().parse::<u64>().map_err(|_| ConfigError::InvalidValue {
            var: TIMEOUT_ENV_VAR,
            value: raw.clone(),
        })?;
        Ok(config.with_timeout(Duration::from_secs(secs)))
    }
}
