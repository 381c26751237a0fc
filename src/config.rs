//! Configuration Module
//!
//! Handles loading client configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Client configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root URL of the analysis service
    pub api_base_url: String,
    /// Per-request HTTP timeout in seconds
    pub request_timeout: u64,
    /// Maximum age in seconds of a cached history series
    pub history_cache_ttl: u64,
    /// Default lookback window for sector statistics
    pub sector_lookback_days: u32,
    /// Sector statistics auto-refresh interval in seconds
    pub sector_refresh_interval: u64,
    /// System metrics auto-refresh interval in seconds
    pub system_refresh_interval: u64,
    /// Default notification lifetime in milliseconds
    pub notification_duration_ms: u64,
    /// Background stale-entry sweep interval in seconds
    pub cache_sweep_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `API_BASE_URL` - Analysis service root (default: http://localhost:8000/api)
    /// - `REQUEST_TIMEOUT_SECS` - HTTP timeout (default: 30)
    /// - `HISTORY_CACHE_TTL_SECS` - History cache max age (default: 900)
    /// - `SECTOR_LOOKBACK_DAYS` - Sector stats window (default: 30)
    /// - `SECTOR_REFRESH_SECS` - Sector auto-refresh (default: 300)
    /// - `SYSTEM_REFRESH_SECS` - System metrics auto-refresh (default: 30)
    /// - `NOTIFICATION_DURATION_MS` - Toast lifetime (default: 5000)
    /// - `CACHE_SWEEP_INTERVAL_SECS` - Stale sweep frequency (default: 60)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_base_url: env::var("API_BASE_URL").unwrap_or(defaults.api_base_url),
            request_timeout: env_or("REQUEST_TIMEOUT_SECS", defaults.request_timeout),
            history_cache_ttl: env_or("HISTORY_CACHE_TTL_SECS", defaults.history_cache_ttl),
            sector_lookback_days: env_or("SECTOR_LOOKBACK_DAYS", defaults.sector_lookback_days),
            sector_refresh_interval: env_or(
                "SECTOR_REFRESH_SECS",
                defaults.sector_refresh_interval,
            ),
            system_refresh_interval: env_or(
                "SYSTEM_REFRESH_SECS",
                defaults.system_refresh_interval,
            ),
            notification_duration_ms: env_or(
                "NOTIFICATION_DURATION_MS",
                defaults.notification_duration_ms,
            ),
            cache_sweep_interval: env_or(
                "CACHE_SWEEP_INTERVAL_SECS",
                defaults.cache_sweep_interval,
            ),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    pub fn history_max_age(&self) -> Duration {
        Duration::from_secs(self.history_cache_ttl)
    }

    pub fn sector_refresh(&self) -> Duration {
        Duration::from_secs(self.sector_refresh_interval)
    }

    pub fn system_refresh(&self) -> Duration {
        Duration::from_secs(self.system_refresh_interval)
    }

    pub fn notification_duration(&self) -> Duration {
        Duration::from_millis(self.notification_duration_ms)
    }

    pub fn cache_sweep(&self) -> Duration {
        Duration::from_secs(self.cache_sweep_interval)
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000/api".to_string(),
            request_timeout: 30,
            history_cache_ttl: 900,
            sector_lookback_days: 30,
            sector_refresh_interval: 300,
            system_refresh_interval: 30,
            notification_duration_ms: 5000,
            cache_sweep_interval: 60,
        }
    }
}
