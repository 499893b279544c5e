//! Cache and queue backend configuration module

use serde::{Deserialize, Serialize};

use super::env_or;

/// Which store backs the OTP queue, rate-limit counters and credentials
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueBackend {
    /// Process-local expiring cache, single instance only
    #[default]
    Memory,
    /// Shared Redis store, safe for multi-instance fan-out
    Redis,
}

impl std::str::FromStr for QueueBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" | "local" => Ok(QueueBackend::Memory),
            "redis" | "shared" => Ok(QueueBackend::Redis),
            _ => Err(format!("Invalid queue backend: {}", s)),
        }
    }
}

/// Cache configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Selected backend
    #[serde(default)]
    pub backend: QueueBackend,

    /// Redis connection URL
    pub url: String,

    /// Maximum number of connection attempts on startup
    pub max_retries: u32,

    /// Base delay between connection attempts in milliseconds
    pub retry_delay_ms: u64,

    /// Maximum number of rate-limit counters held by the process-local cache
    ///
    /// Queue entries are not bounded by this. When the counter cache is full
    /// the least valuable counters are evicted, and an evicted counter starts
    /// again from zero.
    #[serde(default = "default_memory_capacity")]
    pub memory_max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: QueueBackend::default(),
            url: String::from("redis://localhost:6379"),
            max_retries: 3,
            retry_delay_ms: 100,
            memory_max_capacity: default_memory_capacity(),
        }
    }
}

impl CacheConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            backend: env_or("QUEUE_BACKEND", defaults.backend),
            url: std::env::var("REDIS_URL").unwrap_or(defaults.url),
            max_retries: env_or("REDIS_MAX_RETRIES", defaults.max_retries),
            retry_delay_ms: env_or("REDIS_RETRY_DELAY_MS", defaults.retry_delay_ms),
            memory_max_capacity: env_or("MEMORY_CACHE_MAX_CAPACITY", defaults.memory_max_capacity),
        }
    }

    /// Create a new Redis-backed cache configuration with URL
    pub fn redis(url: impl Into<String>) -> Self {
        Self {
            backend: QueueBackend::Redis,
            url: url.into(),
            ..Default::default()
        }
    }
}

fn default_memory_capacity() -> u64 {
    100_000
}
