//! Configuration management for the postboard application.
//!
//! Loads configuration from environment variables with sensible defaults.

use crate::error::ConfigError;
use postboard_runtime::StoreConfig;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Default remote API
pub const DEFAULT_API_URL: &str = "https://jsonplaceholder.typicode.com";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Remote API configuration
    pub api: ApiConfig,
    /// Store runtime configuration
    pub store: StoreSettings,
}

/// Remote API configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL; `/posts` and `/users` are appended
    pub base_url: String,
    /// `User-Agent` header sent with every request
    pub user_agent: String,
}

/// Store runtime configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout: u64,
    /// Capacity of the effect-action broadcast channel
    pub broadcast_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                base_url: DEFAULT_API_URL.to_string(),
                user_agent: concat!("postboard/", env!("CARGO_PKG_VERSION")).to_string(),
            },
            store: StoreSettings {
                shutdown_timeout: 5,
                broadcast_capacity: 16,
            },
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// | Variable | Default |
    /// |---|---|
    /// | `POSTBOARD_API_URL` | `https://jsonplaceholder.typicode.com` |
    /// | `POSTBOARD_USER_AGENT` | `postboard/<version>` |
    /// | `POSTBOARD_SHUTDOWN_TIMEOUT` | `5` |
    /// | `POSTBOARD_BROADCAST_CAPACITY` | `16` |
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the base URL is not an absolute http(s)
    /// URL or a numeric variable does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable source
    ///
    /// # Errors
    ///
    /// See [`Config::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let base_url = lookup("POSTBOARD_API_URL").unwrap_or(defaults.api.base_url);
        validate_base_url(&base_url)?;

        let config = Self {
            api: ApiConfig {
                base_url,
                user_agent: lookup("POSTBOARD_USER_AGENT").unwrap_or(defaults.api.user_agent),
            },
            store: StoreSettings {
                shutdown_timeout: parse_number(
                    &lookup,
                    "POSTBOARD_SHUTDOWN_TIMEOUT",
                    defaults.store.shutdown_timeout,
                )?,
                broadcast_capacity: parse_number(
                    &lookup,
                    "POSTBOARD_BROADCAST_CAPACITY",
                    defaults.store.broadcast_capacity,
                )?,
            },
        };

        Ok(config)
    }

    /// Override the API base URL
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] under the same rules as
    /// [`from_lookup`](Self::from_lookup).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Result<Self, ConfigError> {
        let base_url = base_url.into();
        validate_base_url(&base_url)?;
        self.api.base_url = base_url;
        Ok(self)
    }

    /// Override the shutdown timeout
    #[must_use]
    pub const fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.store.shutdown_timeout = timeout.as_secs();
        self
    }

    /// Graceful shutdown timeout
    #[must_use]
    pub const fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.store.shutdown_timeout)
    }

    /// Runtime configuration for the store
    #[must_use]
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig::default()
            .with_broadcast_capacity(self.store.broadcast_capacity.max(1))
            .with_shutdown_timeout(self.shutdown_timeout())
    }
}

fn validate_base_url(url: &str) -> Result<(), ConfigError> {
    let parsed = reqwest::Url::parse(url).map_err(|e| ConfigError::InvalidBaseUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    match parsed.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(ConfigError::InvalidBaseUrl {
            url: url.to_string(),
            reason: format!("unsupported scheme {scheme}"),
        }),
    }
}

fn parse_number<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { name, value }),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();

        assert_eq!(config.api.base_url, DEFAULT_API_URL);
        assert!(config.api.user_agent.starts_with("postboard/"));
        assert_eq!(config.shutdown_timeout(), Duration::from_secs(5));
        assert_eq!(config.store.broadcast_capacity, 16);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("POSTBOARD_API_URL", "http://localhost:3500"),
            ("POSTBOARD_SHUTDOWN_TIMEOUT", "12"),
            ("POSTBOARD_USER_AGENT", "tests"),
        ]))
        .unwrap();

        assert_eq!(config.api.base_url, "http://localhost:3500");
        assert_eq!(config.api.user_agent, "tests");
        assert_eq!(config.store_config().default_shutdown_timeout, Duration::from_secs(12));
    }

    #[test]
    fn test_invalid_url() {
        let err = Config::from_lookup(lookup(&[("POSTBOARD_API_URL", "not a url")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBaseUrl { .. }));

        let err = Config::from_lookup(lookup(&[("POSTBOARD_API_URL", "ftp://host")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBaseUrl { .. }));
    }

    #[test]
    fn test_with_base_url_validates() {
        let config = Config::from_lookup(lookup(&[])).unwrap();

        let err = config.clone().with_base_url("localhost:3500").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBaseUrl { .. }));

        let config = config.with_base_url("http://localhost:3500").unwrap();
        assert_eq!(config.api.base_url, "http://localhost:3500");
    }

    #[test]
    fn test_invalid_number() {
        let err =
            Config::from_lookup(lookup(&[("POSTBOARD_SHUTDOWN_TIMEOUT", "soon")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidNumber {
                name: "POSTBOARD_SHUTDOWN_TIMEOUT",
                value: "soon".to_string(),
            }
        );
    }
}
