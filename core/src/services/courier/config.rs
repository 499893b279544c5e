//! Configuration for the courier service

use std::time::Duration;

use oc_shared::{RateLimitConfig, WorkerConfig};

use crate::domain::value_objects::RetryPolicy;

/// Per-receiver admission limit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendRateLimit {
    pub limit: u64,
    pub window: Duration,
}

/// Configuration for the courier service
#[derive(Debug, Clone)]
pub struct CourierConfig {
    /// Backoff applied to failed deliveries
    pub retry_policy: RetryPolicy,
    /// Lifetime of a pending OTP, also quoted in the message body
    pub otp_ttl: Duration,
    /// `None` disables admission control
    pub rate_limit: Option<SendRateLimit>,
}

impl Default for CourierConfig {
    fn default() -> Self {
        Self {
            retry_policy: RetryPolicy::default(),
            otp_ttl: Duration::from_secs(300),
            rate_limit: Some(SendRateLimit {
                limit: 5,
                window: Duration::from_secs(3600),
            }),
        }
    }
}

impl CourierConfig {
    pub fn from_config(worker: &WorkerConfig, rate_limit: &RateLimitConfig) -> Self {
        Self {
            retry_policy: RetryPolicy::from_config(worker),
            otp_ttl: worker.otp_ttl(),
            rate_limit: rate_limit.enabled.then(|| SendRateLimit {
                limit: rate_limit.per_receiver_limit,
                window: Duration::from_secs(rate_limit.window_seconds),
            }),
        }
    }
}
