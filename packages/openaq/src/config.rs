//! `OpenAQ` service configuration.
//!
//! Defaults are embedded at compile time from `services/openaq.toml`.
//! The API key and an optional base URL override come from the
//! environment.

use std::time::Duration;

use serde::Deserialize;

const SERVICE_TOML: &str = include_str!("../services/openaq.toml");

/// Environment variable holding the `OpenAQ` API key.
pub const API_KEY_ENV: &str = "OPENAQ_API_KEY";

/// Environment variable overriding the service base URL.
pub const BASE_URL_ENV: &str = "OPENAQ_BASE_URL";

/// Static service settings loaded from TOML.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OpenAqService {
    /// Unique identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// API base URL, without a trailing slash.
    pub base_url: String,
    /// Stations requested per directory query.
    pub result_limit: u32,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Largest radius, in metres, sent as a point + radius query.
    pub max_point_radius_m: u32,
}

impl OpenAqService {
    /// Returns the embedded service definition.
    ///
    /// # Panics
    ///
    /// Panics if the embedded TOML is malformed (covered by tests).
    #[must_use]
    pub fn embedded() -> Self {
        toml::de::from_str(SERVICE_TOML)
            .unwrap_or_else(|e| panic!("Failed to parse embedded OpenAQ service config: {e}"))
    }
}

/// Everything needed to construct an [`crate::OpenAqClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenAqConfig {
    /// Service settings.
    pub service: OpenAqService,
    /// API key; `None` means the client is not configured.
    pub api_key: Option<String>,
}

impl OpenAqConfig {
    /// Builds a config from the embedded defaults and the given key.
    #[must_use]
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            service: OpenAqService::embedded(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        }
    }

    /// Builds a config from the embedded defaults, `OPENAQ_API_KEY` and
    /// `OPENAQ_BASE_URL`.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::new(std::env::var(API_KEY_ENV).ok());
        if let Ok(url) = std::env::var(BASE_URL_ENV) {
            config.service.base_url = url;
        }
        if config.api_key.is_none() {
            log::warn!("{API_KEY_ENV} is not set; air quality lookups will be unavailable");
        }
        config
    }

    /// Replaces the base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.service.base_url = base_url.into();
        self
    }

    /// Whether an API key is present.
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Per-request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.service.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_service_parses() {
        let service = OpenAqService::embedded();
        assert_eq!(service.id, "openaq");
        assert!(service.base_url.starts_with("https://"));
        assert!(!service.base_url.ends_with('/'));
        assert!(service.result_limit > 0);
        assert_eq!(service.max_point_radius_m, 25_000);
    }

    #[test]
    fn blank_key_is_not_configured() {
        assert!(!OpenAqConfig::new(None).is_configured());
        assert!(!OpenAqConfig::new(Some("  ".to_string())).is_configured());
        assert!(OpenAqConfig::new(Some("key".to_string())).is_configured());
    }

    #[test]
    fn base_url_override() {
        let config = OpenAqConfig::new(None).with_base_url("http://localhost:9000/v3");
        assert_eq!(config.service.base_url, "http://localhost:9000/v3");
        assert_eq!(config.timeout(), Duration::from_secs(config.service.timeout_secs));
    }
}
