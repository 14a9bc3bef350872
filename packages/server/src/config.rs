//! Server settings read from the environment.

use std::time::Duration;

/// Default wall-clock budget for one air quality resolution.
pub const DEFAULT_RESOLVE_TIMEOUT: Duration = Duration::from_secs(20);

/// Listener and request-budget settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address to bind (`BIND_ADDR`, default `127.0.0.1`).
    pub bind_addr: String,
    /// Port to bind (`PORT`, default 8080).
    pub port: u16,
    /// Budget for a single resolution (`RESOLVE_TIMEOUT_SECS`, default 20).
    pub resolve_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1".to_string(),
            port: 8080,
            resolve_timeout: DEFAULT_RESOLVE_TIMEOUT,
        }
    }
}

impl ServerConfig {
    /// Reads `BIND_ADDR`, `PORT` and `RESOLVE_TIMEOUT_SECS`.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable lookup. Unset or
    /// unparseable values fall back to the defaults.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let port = lookup("PORT").and_then(|p| p.parse().ok());
        let timeout_secs = lookup("RESOLVE_TIMEOUT_SECS")
            .and_then(|t| t.parse::<u64>().ok())
            .filter(|&t| t > 0);

        Self {
            bind_addr: lookup("BIND_ADDR").unwrap_or(defaults.bind_addr),
            port: port.unwrap_or(defaults.port),
            resolve_timeout: timeout_secs.map_or(defaults.resolve_timeout, Duration::from_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: BTreeMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        assert_eq!(ServerConfig::from_lookup(lookup(&[])), ServerConfig::default());
    }

    #[test]
    fn reads_overrides() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("BIND_ADDR", "0.0.0.0"),
            ("PORT", "9000"),
            ("RESOLVE_TIMEOUT_SECS", "5"),
        ]));
        assert_eq!(config.bind_addr, "0.0.0.0");
        assert_eq!(config.port, 9000);
        assert_eq!(config.resolve_timeout, Duration::from_secs(5));
    }

    #[test]
    fn ignores_invalid_values() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("PORT", "eighty"),
            ("RESOLVE_TIMEOUT_SECS", "0"),
        ]));
        assert_eq!(config.port, 8080);
        assert_eq!(config.resolve_timeout, DEFAULT_RESOLVE_TIMEOUT);
    }
}
