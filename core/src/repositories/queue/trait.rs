//! OTP queue trait shared by the process-local and the Redis backends.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;

use crate::domain::entities::{OtpQueueItem, RetryTask};
use crate::errors::DomainResult;

/// Durable record of pending OTPs and scheduled retry tasks
///
/// Both kinds of entries are keyed by (tenant, receiver). Every mutation is a
/// single-key read-modify-write; two writers racing on the same key may lose
/// one update.
#[async_trait]
pub trait OtpQueue: Send + Sync {
    /// Upsert the pending item under its key with the given expiry
    ///
    /// An existing item for the same key is overwritten.
    async fn enqueue(&self, item: &OtpQueueItem, ttl: Duration) -> DomainResult<()>;

    /// Fetch the pending item for a (tenant, receiver) pair
    ///
    /// # Returns
    /// * `Ok(OtpQueueItem)` - Item present and not expired
    /// * `Err(DomainError::NotFound)` - No item, or the item expired
    async fn get(&self, tenant_id: &str, receiver: &str) -> DomainResult<OtpQueueItem>;

    /// Remove the pending item. Deleting an absent key succeeds.
    async fn delete(&self, tenant_id: &str, receiver: &str) -> DomainResult<()>;

    /// Schedule `task` to become due `delay` from now
    ///
    /// The stored retry count is `existing + 1` when a task already exists for
    /// the key and 1 otherwise; the count carried by `task` is ignored.
    ///
    /// # Returns
    /// The task as stored, with its final count and due time
    async fn enqueue_retry(&self, task: &RetryTask, delay: Duration) -> DomainResult<RetryTask>;

    /// All retry tasks across tenants with `ready_at <= now`
    async fn get_due_retry_tasks(&self, now: DateTime<Utc>) -> DomainResult<Vec<RetryTask>>;

    /// Remove the retry task for a (tenant, receiver) pair. Idempotent.
    async fn delete_retry(&self, tenant_id: &str, receiver: &str) -> DomainResult<()>;

    /// Remove the retry task identified by `task`
    async fn delete_retry_task(&self, task: &RetryTask) -> DomainResult<()> {
        self.delete_retry(&task.tenant_id, &task.receiver).await
    }
}
