//! Fixed-window counter limiter

use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::errors::{DomainError, DomainResult};

use super::traits::CounterStore;

/// Builders for the conventional counter keys
pub struct RateLimitKey;

impl RateLimitKey {
    /// Key counting OTP sends to one receiver of one tenant
    ///
    /// The receiver is hashed so raw phone numbers and addresses never appear
    /// in the store's keyspace.
    pub fn otp_send(tenant_id: &str, receiver: &str) -> String {
        format!("otp:ratelimit:{}:{}:send", tenant_id, hash_receiver(receiver))
    }
}

fn hash_receiver(receiver: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(receiver.as_bytes());
    hex::encode(hasher.finalize())
}

/// Counter bound to a fixed window
///
/// Every registered attempt rewrites the counter with a fresh expiry of one
/// full window, so a key that keeps receiving attempts stays limited until it
/// goes quiet for a whole window (a leaky fixed window).
pub struct FixedWindowRateLimiter {
    store: Arc<dyn CounterStore>,
}

impl FixedWindowRateLimiter {
    pub fn new(store: Arc<dyn CounterStore>) -> Self {
        Self { store }
    }

    /// Whether `key` already used up `limit` attempts in the current window
    ///
    /// A key with no counter is never limited.
    pub async fn is_limited(&self, key: &str, limit: u64, _window: Duration) -> DomainResult<bool> {
        let count = self.store.get_count(key).await?.unwrap_or(0);
        Ok(count >= limit)
    }

    /// Count one attempt and return the new total
    pub async fn register_attempt(&self, key: &str, window: Duration) -> DomainResult<u64> {
        let count = self.store.get_count(key).await?.unwrap_or(0) + 1;
        self.store.set_count(key, count, window).await?;
        debug!(key = %key, count, event = "rate_limit_attempt_registered");
        Ok(count)
    }

    /// Drop the counter for `key`
    pub async fn reset_attempts(&self, key: &str) -> DomainResult<()> {
        self.store.delete_count(key).await
    }

    /// Admission check followed by registration
    ///
    /// # Returns
    /// * `Ok(count)` - Attempt admitted and counted
    /// * `Err(DomainError::RateLimitExceeded)` - Limit already reached, nothing counted
    pub async fn check(&self, key: &str, limit: u64, window: Duration) -> DomainResult<u64> {
        if self.is_limited(key, limit, window).await? {
            warn!(key = %key, limit, event = "rate_limit_exceeded");
            return Err(DomainError::RateLimitExceeded {
                key: key.to_string(),
                limit,
                window_seconds: window.as_secs(),
            });
        }
        self.register_attempt(key, window).await
    }
}
