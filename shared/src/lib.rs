//! Shared utilities and configuration types for the OtpCourier workspace
//!
//! This crate provides common functionality used across all server modules:
//! - Configuration types loaded from the environment
//! - Masking helpers for receiver addresses in logs

pub mod config;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, CacheConfig, ChannelsConfig, Environment, LogFormat, LoggingConfig,
    QueueBackend, RateLimitConfig, WorkerConfig,
};
pub use utils::mask;
