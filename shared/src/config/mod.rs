//! Configuration module with business-specific sub-modules
//!
//! This module organizes configuration into logical areas:
//! - `cache` - Queue/counter backend and Redis connection
//! - `channels` - Notification channel endpoints and secrets
//! - `environment` - Environment detection and logging configuration
//! - `rate_limit` - OTP issuance limits
//! - `worker` - Retry and token-refresh scheduling

pub mod cache;
pub mod channels;
pub mod environment;
pub mod rate_limit;
pub mod worker;

use serde::{Deserialize, Serialize};
use std::str::FromStr;

// Re-export commonly used types
pub use cache::{CacheConfig, QueueBackend};
pub use channels::{
    ChannelsConfig, ChatPlatformConfig, MessagingAppConfig, SmsVendorConfig, WebhookConfig,
};
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use rate_limit::RateLimitConfig;
pub use worker::WorkerConfig;

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    pub environment: Environment,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Cache and queue backend configuration
    pub cache: CacheConfig,

    /// Rate limiting configuration
    pub rate_limit: RateLimitConfig,

    /// Background worker configuration
    pub worker: WorkerConfig,

    /// Channel configuration
    #[serde(default)]
    pub channels: ChannelsConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let env = Environment::default();
        Self {
            environment: env,
            logging: LoggingConfig::for_environment(env),
            cache: CacheConfig::default(),
            rate_limit: RateLimitConfig::default(),
            worker: WorkerConfig::default(),
            channels: ChannelsConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment
    ///
    /// Reads the environment-specific `.env` file first (when present), then
    /// the plain `.env`, then the process environment.
    pub fn from_env() -> Self {
        let environment = Environment::from_env();
        dotenvy::from_filename(environment.env_file()).ok();
        dotenvy::dotenv().ok();

        let rate_limit = if environment.is_development() {
            RateLimitConfig {
                enabled: env_or("RATE_LIMIT_ENABLED", true),
                ..RateLimitConfig::development()
            }
        } else {
            RateLimitConfig::from_env()
        };

        Self {
            environment,
            logging: LoggingConfig::for_environment(environment).with_env_overrides(),
            cache: CacheConfig::from_env(),
            rate_limit,
            worker: WorkerConfig::from_env(),
            channels: ChannelsConfig::from_env(),
        }
    }
}

/// Read and parse an environment variable, falling back to `default`
pub(crate) fn env_or<T: FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
