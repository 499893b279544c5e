//! Background worker configuration module

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::env_or;

/// Scheduling and retry policy settings for the background workers
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorkerConfig {
    /// How often the retry worker scans for due tasks (seconds)
    pub retry_interval_seconds: u64,

    /// How often the token-refresh worker runs (seconds)
    pub token_refresh_interval_seconds: u64,

    /// Credentials expiring within this window are refreshed proactively (seconds)
    pub refresh_ahead_seconds: u64,

    /// Base delay of the exponential retry backoff (seconds)
    pub retry_base_delay_seconds: u64,

    /// Ceiling of the retry backoff (seconds)
    pub retry_max_delay_seconds: u64,

    /// Retry tasks at or beyond this count are dropped
    pub max_retries: u32,

    /// Lifetime of a pending OTP (seconds)
    pub otp_ttl_seconds: u64,

    /// Lifetime of an untouched retry entry in the store (seconds)
    pub retry_retention_seconds: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            retry_interval_seconds: 10,
            token_refresh_interval_seconds: 300,
            refresh_ahead_seconds: 600,
            retry_base_delay_seconds: 5,
            retry_max_delay_seconds: 300,
            max_retries: 5,
            otp_ttl_seconds: 300,
            retry_retention_seconds: 86_400,
        }
    }
}

impl WorkerConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            retry_interval_seconds: env_or("RETRY_WORKER_INTERVAL_SECONDS", d.retry_interval_seconds),
            token_refresh_interval_seconds: env_or(
                "TOKEN_REFRESH_INTERVAL_SECONDS",
                d.token_refresh_interval_seconds,
            ),
            refresh_ahead_seconds: env_or("TOKEN_REFRESH_AHEAD_SECONDS", d.refresh_ahead_seconds),
            retry_base_delay_seconds: env_or("RETRY_BASE_DELAY_SECONDS", d.retry_base_delay_seconds),
            retry_max_delay_seconds: env_or("RETRY_MAX_DELAY_SECONDS", d.retry_max_delay_seconds),
            max_retries: env_or("RETRY_MAX_ATTEMPTS", d.max_retries),
            otp_ttl_seconds: env_or("OTP_TTL_SECONDS", d.otp_ttl_seconds),
            retry_retention_seconds: env_or("RETRY_RETENTION_SECONDS", d.retry_retention_seconds),
        }
    }

    /// Scan period, never shorter than one second
    pub fn retry_interval(&self) -> Duration {
        Duration::from_secs(self.retry_interval_seconds.max(1))
    }

    pub fn token_refresh_interval(&self) -> Duration {
        Duration::from_secs(self.token_refresh_interval_seconds.max(1))
    }

    pub fn otp_ttl(&self) -> Duration {
        Duration::from_secs(self.otp_ttl_seconds)
    }

    pub fn retry_retention(&self) -> Duration {
        Duration::from_secs(self.retry_retention_seconds)
    }
}
