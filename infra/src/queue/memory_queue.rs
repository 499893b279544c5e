//! Process-local OTP queue over the moka cache

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use oc_core::{DomainError, DomainResult, OtpQueue, OtpQueueItem, RetryTask, RETRY_KEY_PREFIX};

use crate::cache::MemoryCache;

/// Queue whose entries live in a [`MemoryCache`]
///
/// Due retry tasks are found with a prefix scan over `otp:retry:`.
pub struct MemoryOtpQueue {
    cache: Arc<MemoryCache>,
    /// How long a retry entry outlives its due time
    retention: Duration,
}

impl MemoryOtpQueue {
    pub fn new(cache: Arc<MemoryCache>, retention: Duration) -> Self {
        Self { cache, retention }
    }

    async fn read_retry(&self, key: &str) -> DomainResult<Option<RetryTask>> {
        match self.cache.get(key).await {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl OtpQueue for MemoryOtpQueue {
    async fn enqueue(&self, item: &OtpQueueItem, ttl: Duration) -> DomainResult<()> {
        let raw = serde_json::to_string(item)?;
        self.cache.set_with_expiry(&item.key(), raw, ttl).await;
        Ok(())
    }

    async fn get(&self, tenant_id: &str, receiver: &str) -> DomainResult<OtpQueueItem> {
        let key = OtpQueueItem::key_for(tenant_id, receiver);
        match self.cache.get(&key).await {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Err(DomainError::not_found(key)),
        }
    }

    async fn delete(&self, tenant_id: &str, receiver: &str) -> DomainResult<()> {
        self.cache
            .delete(&OtpQueueItem::key_for(tenant_id, receiver))
            .await;
        Ok(())
    }

    async fn enqueue_retry(&self, task: &RetryTask, delay: Duration) -> DomainResult<RetryTask> {
        let key = task.key();
        let retry_count = self
            .read_retry(&key)
            .await?
            .map_or(1, |existing| existing.retry_count + 1);

        let stored = task.scheduled(retry_count, Utc::now(), delay);
        let raw = serde_json::to_string(&stored)?;
        self.cache
            .set_with_expiry(&key, raw, delay.saturating_add(self.retention))
            .await;
        Ok(stored)
    }

    async fn get_due_retry_tasks(&self, now: DateTime<Utc>) -> DomainResult<Vec<RetryTask>> {
        let prefix = format!("{}:", RETRY_KEY_PREFIX);
        let mut due = Vec::new();

        for (key, raw) in self.cache.scan_prefix(&prefix) {
            match serde_json::from_str::<RetryTask>(&raw) {
                Ok(task) if task.is_due(now) => due.push(task),
                Ok(_) => {}
                Err(e) => warn!(key = %key, error = %e, event = "retry_entry_corrupt"),
            }
        }

        Ok(due)
    }

    async fn delete_retry(&self, tenant_id: &str, receiver: &str) -> DomainResult<()> {
        self.cache
            .delete(&RetryTask::key_for(tenant_id, receiver))
            .await;
        Ok(())
    }
}
