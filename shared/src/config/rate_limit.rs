//! Rate limiting configuration module

use serde::{Deserialize, Serialize};

use super::env_or;

/// Rate limiting configuration for OTP issuance
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitConfig {
    /// Enable rate limiting
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Max OTP sends per (tenant, receiver) within one window
    pub per_receiver_limit: u64,

    /// Window length in seconds
    pub window_seconds: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            per_receiver_limit: 5,
            window_seconds: 3600,
        }
    }
}

impl RateLimitConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            enabled: env_or("RATE_LIMIT_ENABLED", defaults.enabled),
            per_receiver_limit: env_or("RATE_LIMIT_PER_RECEIVER", defaults.per_receiver_limit),
            window_seconds: env_or("RATE_LIMIT_WINDOW_SECONDS", defaults.window_seconds),
        }
    }

    /// Relaxed limits for local development
    pub fn development() -> Self {
        Self {
            per_receiver_limit: 100,
            window_seconds: 60,
            ..Default::default()
        }
    }
}

fn default_enabled() -> bool {
    true
}
