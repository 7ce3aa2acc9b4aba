use anyhow::{Context, Result};
use std::str::FromStr;
use std::time::Duration;

/// Minimum interval between refresh attempts
pub const DEFAULT_REFRESH_COOLDOWN: Duration = Duration::from_secs(10);

/// Session pipeline configuration
#[derive(Clone, Debug)]
pub struct GuardConfig {
    /// Absolute URL of the refresh-token endpoint
    pub refresh_url: String,

    /// Minimum interval between refresh attempts
    pub refresh_cooldown: Duration,

    /// HTTP connect timeout (seconds)
    pub connect_timeout: u64,

    /// HTTP request timeout (seconds)
    pub request_timeout: u64,

    /// Connection pool size per host
    pub max_connections: usize,
}

impl GuardConfig {
    /// Create a configuration with defaults for everything but the refresh URL
    pub fn new(refresh_url: impl Into<String>) -> Self {
        Self {
            refresh_url: refresh_url.into(),
            refresh_cooldown: DEFAULT_REFRESH_COOLDOWN,
            connect_timeout: 30,
            request_timeout: 60,
            max_connections: 20,
        }
    }

    /// Load configuration from the environment (reads .env if present)
    ///
    /// `SESSION_REFRESH_URL` is required; everything else falls back to
    /// defaults when unset or unparseable.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let refresh_url = std::env::var("SESSION_REFRESH_URL")
            .context("SESSION_REFRESH_URL is required (absolute URL of the refresh endpoint)")?;

        Ok(Self {
            refresh_url,
            refresh_cooldown: Duration::from_millis(env_parse(
                "SESSION_REFRESH_COOLDOWN_MS",
                DEFAULT_REFRESH_COOLDOWN.as_millis() as u64,
            )),
            connect_timeout: env_parse("HTTP_CONNECT_TIMEOUT", 30),
            request_timeout: env_parse("HTTP_REQUEST_TIMEOUT", 60),
            max_connections: env_parse("HTTP_MAX_CONNECTIONS", 20),
        })
    }
}

/// Parse an environment variable, falling back to a default
fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GuardConfig::new("https://shop.example.com/api/auth/refresh-token");
        assert_eq!(config.refresh_cooldown, Duration::from_secs(10));
        assert_eq!(config.connect_timeout, 30);
        assert_eq!(config.request_timeout, 60);
        assert_eq!(config.max_connections, 20);
    }

    #[test]
    fn test_env_parse_unset_uses_default() {
        assert_eq!(env_parse("SESSION_TEST_UNSET_VAR", 42u64), 42);
    }

    #[test]
    fn test_env_parse_reads_value() {
        std::env::set_var("SESSION_TEST_COOLDOWN_VAR", "2500");
        assert_eq!(env_parse("SESSION_TEST_COOLDOWN_VAR", 0u64), 2500);
        std::env::remove_var("SESSION_TEST_COOLDOWN_VAR");
    }

    #[test]
    fn test_env_parse_garbage_uses_default() {
        std::env::set_var("SESSION_TEST_GARBAGE_VAR", "not-a-number");
        assert_eq!(env_parse("SESSION_TEST_GARBAGE_VAR", 7usize), 7);
        std::env::remove_var("SESSION_TEST_GARBAGE_VAR");
    }
}
