//! Exponential backoff policy for retry tasks.

use std::time::Duration;

use oc_shared::WorkerConfig;

/// Backoff and give-up policy applied to failed deliveries
///
/// The delay before the next attempt is `min(2^retry_count * base_delay, max_delay)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub base_delay: Duration,
    pub max_delay: Duration,
    /// Tasks whose count reached this value are dropped after a failed attempt
    pub max_retries: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_secs(5),
            max_delay: Duration::from_secs(300),
            max_retries: 5,
        }
    }
}

impl RetryPolicy {
    pub fn new(base_delay: Duration, max_delay: Duration, max_retries: u32) -> Self {
        Self {
            base_delay,
            max_delay,
            max_retries,
        }
    }

    pub fn from_config(config: &WorkerConfig) -> Self {
        Self {
            base_delay: Duration::from_secs(config.retry_base_delay_seconds),
            max_delay: Duration::from_secs(config.retry_max_delay_seconds),
            max_retries: config.max_retries,
        }
    }

    /// Delay before the attempt that follows `retry_count` previous retries
    pub fn delay_for(&self, retry_count: u32) -> Duration {
        2u32.checked_pow(retry_count)
            .and_then(|factor| self.base_delay.checked_mul(factor))
            .map_or(self.max_delay, |delay| delay.min(self.max_delay))
    }

    pub fn is_exhausted(&self, retry_count: u32) -> bool {
        retry_count >= self.max_retries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_grows_exponentially_until_ceiling() {
        let policy = RetryPolicy::new(Duration::from_secs(2), Duration::from_secs(60), 5);

        assert_eq!(policy.delay_for(0), Duration::from_secs(2));
        assert_eq!(policy.delay_for(1), Duration::from_secs(4));
        assert_eq!(policy.delay_for(3), Duration::from_secs(16));
        assert_eq!(policy.delay_for(5), Duration::from_secs(60));
        assert_eq!(policy.delay_for(40), Duration::from_secs(60));
    }

    #[test]
    fn test_exhaustion() {
        let policy = RetryPolicy::default();
        assert!(!policy.is_exhausted(4));
        assert!(policy.is_exhausted(5));
    }

    #[test]
    fn test_from_worker_config() {
        let config = WorkerConfig {
            retry_base_delay_seconds: 1,
            retry_max_delay_seconds: 30,
            max_retries: 3,
            ..Default::default()
        };
        let policy = RetryPolicy::from_config(&config);
        assert_eq!(policy, RetryPolicy::new(Duration::from_secs(1), Duration::from_secs(30), 3));
    }
}
