//! Connection settings, resolved from CLI overrides, the environment, and defaults.

use log::debug;
use std::fmt;
use std::time::Duration;
use url::Url;

use crate::runtime::Runtime;

pub const BASE_URL_ENV: &str = "LISTMONK_BASE_URL";
pub const USERNAME_ENV: &str = "LISTMONK_USERNAME";
pub const API_KEY_ENV: &str = "LISTMONK_API_KEY";
pub const TIMEOUT_ENV: &str = "LISTMONK_TIMEOUT";
pub const RETRY_COUNT_ENV: &str = "LISTMONK_RETRY_COUNT";

pub const DEFAULT_USERNAME: &str = "api";
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_RETRY_COUNT: u32 = 3;

/// Invalid or missing connection settings. Raised before any request is made.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ConfigError(String);

impl ConfigError {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Values given on the command line; they take precedence over the environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub base_url: Option<String>,
    pub username: Option<String>,
    pub api_key: Option<String>,
    pub timeout_ms: Option<i64>,
    pub retry_count: Option<i64>,
}

/// Immutable connection settings shared by every request.
///
/// `base_url` never ends with a slash, `timeout` is non-zero.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub username: String,
    pub api_key: String,
    pub timeout: Duration,
    pub retry_count: u32,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("retry_count", &self.retry_count)
            .finish()
    }
}

impl ClientConfig {
    /// Resolves each setting from `overrides`, then the environment, then defaults.
    #[tracing::instrument(skip(runtime, overrides))]
    pub fn resolve<R: Runtime>(runtime: &R, overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        let raw_base_url = overrides.base_url.or_else(|| runtime.env_var(BASE_URL_ENV).ok());
        let username = overrides
            .username
            .or_else(|| runtime.env_var(USERNAME_ENV).ok())
            .unwrap_or_else(|| DEFAULT_USERNAME.to_string());
        let api_key = overrides.api_key.or_else(|| runtime.env_var(API_KEY_ENV).ok());
        let timeout_ms = overrides
            .timeout_ms
            .or_else(|| read_number_env(runtime, TIMEOUT_ENV))
            .unwrap_or(DEFAULT_TIMEOUT_MS as i64);
        let retry_count = overrides
            .retry_count
            .or_else(|| read_number_env(runtime, RETRY_COUNT_ENV))
            .unwrap_or(DEFAULT_RETRY_COUNT as i64);

        let raw_base_url = match raw_base_url {
            Some(value) if !value.trim().is_empty() => value,
            _ => {
                return Err(ConfigError::new(
                    "Base URL is required. Provide --base-url or set LISTMONK_BASE_URL.",
                ));
            }
        };
        let base_url = normalize_base_url(&raw_base_url)?;

        if username.trim().is_empty() {
            return Err(ConfigError::new(
                "Username is required. Provide --username or set LISTMONK_USERNAME.",
            ));
        }

        let api_key = match api_key {
            Some(value) if !value.trim().is_empty() => value,
            _ => {
                return Err(ConfigError::new(
                    "API key is required. Provide --api-key or set LISTMONK_API_KEY.",
                ));
            }
        };

        if timeout_ms <= 0 {
            return Err(ConfigError::new("Timeout must be a positive number."));
        }

        if retry_count < 0 {
            return Err(ConfigError::new("Retry count cannot be negative."));
        }

        let config = ClientConfig {
            base_url,
            username: username.trim().to_string(),
            api_key: api_key.trim().to_string(),
            timeout: Duration::from_millis(timeout_ms as u64),
            retry_count: u32::try_from(retry_count).unwrap_or(u32::MAX),
        };
        debug!("Resolved configuration: {:?}", config);

        Ok(config)
    }
}

/// Parses the URL and strips trailing slashes from it.
fn normalize_base_url(value: &str) -> Result<String, ConfigError> {
    let invalid = || {
        ConfigError::new(format!(
            "Base URL \"{}\" is not valid. Include the protocol, e.g. https://example.com.",
            value
        ))
    };

    let mut url = Url::parse(value.trim()).map_err(|_| invalid())?;
    if url.cannot_be_a_base() {
        return Err(invalid());
    }

    let path = url.path().trim_end_matches('/').to_string();
    url.set_path(&path);

    Ok(url.as_str().trim_end_matches('/').to_string())
}

/// Unparseable numbers are ignored so the default applies.
fn read_number_env<R: Runtime>(runtime: &R, key: &str) -> Option<i64> {
    let raw = runtime.env_var(key).ok()?;
    match raw.trim().parse::<i64>() {
        Ok(value) => Some(value),
        Err(_) => {
            debug!("Ignoring non-numeric {}={:?}", key, raw);
            None
        }
    }
}
