//! Storage seam for rate-limit counters

use async_trait::async_trait;
use std::time::Duration;

use crate::errors::DomainResult;

/// Key/value store holding expiring integer counters
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Current count, `None` when the key is absent or expired
    async fn get_count(&self, key: &str) -> DomainResult<Option<u64>>;

    /// Write `count` under `key`, expiring after `window`
    async fn set_count(&self, key: &str, count: u64, window: Duration) -> DomainResult<()>;

    /// Remove the counter. Deleting an absent key succeeds.
    async fn delete_count(&self, key: &str) -> DomainResult<()>;
}
