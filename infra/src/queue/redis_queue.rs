//! Shared OTP queue over Redis
//!
//! Pending items are plain values written with `SET ... PX`. Each retry task
//! lives alone in a sorted set under its own key, scored by its due time in
//! epoch seconds, so a due scan is `SCAN MATCH otp:retry:*` followed by
//! `ZRANGEBYSCORE key 0 now` per key.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use oc_core::{DomainError, DomainResult, OtpQueue, OtpQueueItem, RetryTask, RETRY_KEY_PREFIX};

use crate::cache::RedisClient;

pub struct RedisOtpQueue {
    client: Arc<RedisClient>,
    /// How long a retry key outlives its due time
    retention: Duration,
}

impl RedisOtpQueue {
    pub fn new(client: Arc<RedisClient>, retention: Duration) -> Self {
        Self { client, retention }
    }

    async fn current_retry_count(&self, key: &str) -> DomainResult<Option<u32>> {
        let members = self.client.zrange_all(key).await?;
        let Some(raw) = members.first() else {
            return Ok(None);
        };
        let existing: RetryTask = serde_json::from_str(raw)?;
        Ok(Some(existing.retry_count))
    }
}

#[async_trait]
impl OtpQueue for RedisOtpQueue {
    async fn enqueue(&self, item: &OtpQueueItem, ttl: Duration) -> DomainResult<()> {
        let raw = serde_json::to_string(item)?;
        let ttl_ms = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX);
        self.client.set_with_expiry_ms(&item.key(), &raw, ttl_ms).await?;
        Ok(())
    }

    async fn get(&self, tenant_id: &str, receiver: &str) -> DomainResult<OtpQueueItem> {
        let key = OtpQueueItem::key_for(tenant_id, receiver);
        match self.client.get(&key).await? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => {
                debug!(key = %key, event = "pending_otp_missing");
                Err(DomainError::not_found(key))
            }
        }
    }

    async fn delete(&self, tenant_id: &str, receiver: &str) -> DomainResult<()> {
        self.client
            .delete(&OtpQueueItem::key_for(tenant_id, receiver))
            .await?;
        Ok(())
    }

    async fn enqueue_retry(&self, task: &RetryTask, delay: Duration) -> DomainResult<RetryTask> {
        let key = task.key();
        let retry_count = self
            .current_retry_count(&key)
            .await?
            .map_or(1, |count| count + 1);

        let stored = task.scheduled(retry_count, Utc::now(), delay);
        let raw = serde_json::to_string(&stored)?;
        self.client
            .replace_sorted_set(
                &key,
                &raw,
                stored.ready_at.timestamp(),
                delay.saturating_add(self.retention),
            )
            .await?;
        Ok(stored)
    }

    async fn get_due_retry_tasks(&self, now: DateTime<Utc>) -> DomainResult<Vec<RetryTask>> {
        let pattern = format!("{}:*", RETRY_KEY_PREFIX);
        let mut due = Vec::new();

        for key in self.client.scan_match(&pattern).await? {
            for raw in self.client.zrangebyscore(&key, 0, now.timestamp()).await? {
                match serde_json::from_str::<RetryTask>(&raw) {
                    // Scores are whole seconds, so re-check the exact due time
                    Ok(task) if task.is_due(now) => due.push(task),
                    Ok(_) => {}
                    Err(e) => warn!(key = %key, error = %e, event = "retry_entry_corrupt"),
                }
            }
        }

        Ok(due)
    }

    async fn delete_retry(&self, tenant_id: &str, receiver: &str) -> DomainResult<()> {
        self.client
            .delete(&RetryTask::key_for(tenant_id, receiver))
            .await?;
        Ok(())
    }
}
