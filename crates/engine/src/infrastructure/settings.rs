//! Relay settings read from the environment.

use std::net::SocketAddr;
use std::time::Duration;

/// Default time to wait for a dice total before the roll is reported failed
pub const DEFAULT_DICE_ROLL_TIMEOUT_MS: u64 = 4000;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid listen address {0}")]
pub struct InvalidAddress(String);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelaySettings {
    /// Shared secret for the calculation relay; `None` rejects every request
    pub api_key: Option<String>,
    pub host: String,
    pub port: u16,
    /// Comma-separated origins or `*`; `None` installs no CORS layer
    pub cors_allowed_origins: Option<String>,
    pub dice_roll_timeout: Duration,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            api_key: None,
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            cors_allowed_origins: None,
            dice_roll_timeout: Duration::from_millis(DEFAULT_DICE_ROLL_TIMEOUT_MS),
        }
    }
}

impl RelaySettings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from any key lookup. Unparsable numbers fall back to
    /// their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let port = non_empty("SERVER_PORT")
            .or_else(|| non_empty("PORT"))
            .and_then(|p| match p.parse::<u16>() {
                Ok(port) => Some(port),
                Err(_) => {
                    tracing::warn!(value = %p, "Invalid server port, using default");
                    None
                }
            })
            .unwrap_or(DEFAULT_PORT);

        let timeout_ms = non_empty("DICE_ROLL_TIMEOUT_MS")
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|ms| *ms > 0)
            .unwrap_or(DEFAULT_DICE_ROLL_TIMEOUT_MS);

        Self {
            api_key: non_empty("WS_RULES_API_KEY"),
            host: non_empty("SERVER_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            cors_allowed_origins: non_empty("CORS_ALLOWED_ORIGINS"),
            dice_roll_timeout: Duration::from_millis(timeout_ms),
        }
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, InvalidAddress> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse().map_err(|_| InvalidAddress(addr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(pairs: &[(&str, &str)]) -> RelaySettings {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        RelaySettings::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_nothing_is_set() {
        assert_eq!(settings(&[]), RelaySettings::default());
    }

    #[test]
    fn test_reads_every_variable() {
        let s = settings(&[
            ("WS_RULES_API_KEY", "secret"),
            ("SERVER_HOST", "127.0.0.1"),
            ("SERVER_PORT", "8080"),
            ("CORS_ALLOWED_ORIGINS", "https://a.example, https://b.example"),
            ("DICE_ROLL_TIMEOUT_MS", "2500"),
        ]);
        assert_eq!(s.api_key.as_deref(), Some("secret"));
        assert_eq!(s.port, 8080);
        assert_eq!(s.dice_roll_timeout, Duration::from_millis(2500));
        assert_eq!(s.socket_addr().unwrap().to_string(), "127.0.0.1:8080");
    }

    #[test]
    fn test_port_falls_back_to_generic_variable() {
        assert_eq!(settings(&[("PORT", "4100")]).port, 4100);
        assert_eq!(settings(&[("SERVER_PORT", "4200"), ("PORT", "4100")]).port, 4200);
    }

    #[test]
    fn test_blank_key_counts_as_unset() {
        assert_eq!(settings(&[("WS_RULES_API_KEY", "  ")]).api_key, None);
    }

    #[test]
    fn test_bad_numbers_use_defaults() {
        let s = settings(&[("SERVER_PORT", "http"), ("DICE_ROLL_TIMEOUT_MS", "soon")]);
        assert_eq!(s.port, DEFAULT_PORT);
        assert_eq!(s.dice_roll_timeout, Duration::from_millis(DEFAULT_DICE_ROLL_TIMEOUT_MS));
    }

    #[test]
    fn test_unparsable_host_is_an_error() {
        let s = settings(&[("SERVER_HOST", "not a host")]);
        assert!(s.socket_addr().is_err());
    }
}
