//! Configuration Module
//!
//! Handles loading and managing service configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use crate::cache::{DEFAULT_MAX_AGE_MS, DEFAULT_MAX_BYTES, DEFAULT_MAX_ENTRIES};
use crate::render::{ClientConfig, RetryConfig};

/// Default rendering engine endpoint.
pub const DEFAULT_KROKI_URL: &str = "https://kroki.io";

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the Kroki rendering engine
    pub kroki_url: String,
    /// Per-attempt request timeout in milliseconds
    pub render_timeout_ms: u64,
    /// Retries after the first failed attempt
    pub max_retries: u32,
    /// Delay before the first retry in milliseconds
    pub retry_base_delay_ms: u64,
    /// Upper bound on any single backoff delay in milliseconds
    pub retry_max_delay_ms: u64,
    /// Maximum number of cached renders
    pub cache_max_entries: usize,
    /// Maximum total artifact bytes referenced by the cache
    pub cache_max_bytes: u64,
    /// Age after which the prune task drops an entry
    pub cache_max_age_ms: u64,
    /// Prune task interval in seconds
    pub prune_interval: u64,
    /// Directory rendered artifacts are written to
    pub output_dir: PathBuf,
    /// HTTP server port
    pub server_port: u16,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `KROKI_URL` - Rendering engine base URL (default: https://kroki.io)
    /// - `RENDER_TIMEOUT_MS` - Per-attempt timeout (default: 30000)
    /// - `MAX_RETRIES` - Retries after the first attempt (default: 3)
    /// - `RETRY_BASE_DELAY_MS` - First backoff delay (default: 500)
    /// - `RETRY_MAX_DELAY_MS` - Backoff ceiling (default: 10000)
    /// - `CACHE_MAX_ENTRIES` - Maximum cache entries (default: 100)
    /// - `CACHE_MAX_BYTES` - Maximum cached bytes (default: 50 MiB)
    /// - `CACHE_MAX_AGE_MS` - Prune age (default: 3600000)
    /// - `PRUNE_INTERVAL` - Prune frequency in seconds (default: 300)
    /// - `OUTPUT_DIR` - Render output directory (default: $TMPDIR/diagram-cache)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            kroki_url: env::var("KROKI_URL")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.kroki_url),
            render_timeout_ms: parse_var("RENDER_TIMEOUT_MS").unwrap_or(defaults.render_timeout_ms),
            max_retries: parse_var("MAX_RETRIES").unwrap_or(defaults.max_retries),
            retry_base_delay_ms: parse_var("RETRY_BASE_DELAY_MS")
                .unwrap_or(defaults.retry_base_delay_ms),
            retry_max_delay_ms: parse_var("RETRY_MAX_DELAY_MS")
                .unwrap_or(defaults.retry_max_delay_ms),
            cache_max_entries: parse_var("CACHE_MAX_ENTRIES").unwrap_or(defaults.cache_max_entries),
            cache_max_bytes: parse_var("CACHE_MAX_BYTES").unwrap_or(defaults.cache_max_bytes),
            cache_max_age_ms: parse_var("CACHE_MAX_AGE_MS").unwrap_or(defaults.cache_max_age_ms),
            prune_interval: parse_var("PRUNE_INTERVAL").unwrap_or(defaults.prune_interval),
            output_dir: env::var("OUTPUT_DIR")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
        }
    }

    /// Builds the rendering client settings from this configuration.
    ///
    /// The backoff ceiling is raised to the base delay when it is configured
    /// below it.
    pub fn client_config(&self) -> ClientConfig {
        if self.retry_max_delay_ms < self.retry_base_delay_ms {
            warn!(
                "RETRY_MAX_DELAY_MS ({}) is below RETRY_BASE_DELAY_MS ({}), using {} ms as the ceiling",
                self.retry_max_delay_ms, self.retry_base_delay_ms, self.retry_base_delay_ms
            );
        }

        ClientConfig {
            base_url: self.kroki_url.clone(),
            timeout: Duration::from_millis(self.render_timeout_ms),
            retry: RetryConfig {
                max_retries: self.max_retries,
                initial_delay: Duration::from_millis(self.retry_base_delay_ms),
                max_delay: Duration::from_millis(
                    self.retry_max_delay_ms.max(self.retry_base_delay_ms),
                ),
                ..RetryConfig::default()
            },
        }
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            kroki_url: DEFAULT_KROKI_URL.to_string(),
            render_timeout_ms: 30_000,
            max_retries: 3,
            retry_base_delay_ms: 500,
            retry_max_delay_ms: 10_000,
            cache_max_entries: DEFAULT_MAX_ENTRIES,
            cache_max_bytes: DEFAULT_MAX_BYTES,
            cache_max_age_ms: DEFAULT_MAX_AGE_MS,
            prune_interval: 300,
            output_dir: env::temp_dir().join("diagram-cache"),
            server_port: 3000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.kroki_url, "https://kroki.io");
        assert_eq!(config.render_timeout_ms, 30_000);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.cache_max_entries, 100);
        assert_eq!(config.cache_max_bytes, 50 * 1024 * 1024);
        assert_eq!(config.cache_max_age_ms, 3_600_000);
        assert_eq!(config.server_port, 3000);
        assert!(config.output_dir.ends_with("diagram-cache"));
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        for var in [
            "KROKI_URL",
            "RENDER_TIMEOUT_MS",
            "MAX_RETRIES",
            "RETRY_BASE_DELAY_MS",
            "RETRY_MAX_DELAY_MS",
            "CACHE_MAX_ENTRIES",
            "CACHE_MAX_BYTES",
            "CACHE_MAX_AGE_MS",
            "PRUNE_INTERVAL",
            "OUTPUT_DIR",
            "SERVER_PORT",
        ] {
            env::remove_var(var);
        }

        let config = Config::from_env();
        assert_eq!(config.kroki_url, DEFAULT_KROKI_URL);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.cache_max_entries, 100);
        assert_eq!(config.prune_interval, 300);
    }

    #[test]
    fn test_client_config_carries_retry_settings() {
        let config = Config {
            max_retries: 5,
            retry_base_delay_ms: 20,
            render_timeout_ms: 1500,
            ..Config::default()
        };

        let client = config.client_config();
        assert_eq!(client.retry.max_retries, 5);
        assert_eq!(client.retry.initial_delay, Duration::from_millis(20));
        assert_eq!(client.timeout, Duration::from_millis(1500));
        assert_eq!(client.base_url, "https://kroki.io");
        assert_eq!(client.retry.max_delay, Duration::from_millis(10_000));
    }

    #[test]
    fn test_large_base_delay_is_not_capped() {
        let config = Config {
            retry_base_delay_ms: 15_000,
            ..Config::default()
        };

        let retry = config.client_config().retry;
        assert_eq!(retry.max_delay, Duration::from_millis(15_000));
        assert!(retry.delay_for(1) >= Duration::from_millis(15_000));

        let config = Config {
            retry_base_delay_ms: 100,
            retry_max_delay_ms: 30_000,
            ..Config::default()
        };
        assert_eq!(
            config.client_config().retry.max_delay,
            Duration::from_millis(30_000)
        );
    }
}
