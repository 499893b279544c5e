//! Exponential backoff for vendor calls made inside a single attempt

use std::future::Future;
use std::time::Duration;
use tracing::debug;

use crate::errors::DomainResult;

/// Retry configuration for exponential backoff
#[derive(Debug, Clone)]
pub struct BackoffConfig {
    /// Total attempts including the first one
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(5),
        }
    }
}

/// Run `operation` until it succeeds, fails permanently or runs out of attempts
///
/// Only transient errors are retried; the delay doubles after every failure.
pub async fn retry_with_backoff<F, Fut, T>(
    config: &BackoffConfig,
    operation_name: &str,
    mut operation: F,
) -> DomainResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = DomainResult<T>>,
{
    let mut attempts = 0;
    let mut delay = config.initial_delay;

    loop {
        attempts += 1;

        match operation().await {
            Ok(value) => return Ok(value),
            Err(error) => {
                if attempts >= config.max_attempts || !error.is_transient() {
                    return Err(error);
                }

                debug!(
                    operation = operation_name,
                    attempt = attempts,
                    max_attempts = config.max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %error,
                    "Retrying operation with exponential backoff"
                );

                tokio::time::sleep(delay).await;
                delay = delay.saturating_mul(2).min(config.max_delay);
            }
        }
    }
}
