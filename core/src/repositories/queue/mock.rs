//! Mock implementation of OtpQueue for testing

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::domain::entities::{OtpQueueItem, RetryTask};
use crate::errors::{DomainError, DomainResult};

use super::r#trait::OtpQueue;

/// In-memory queue without expiry, for service tests
pub struct MockOtpQueue {
    pending: Arc<RwLock<HashMap<String, (OtpQueueItem, Duration)>>>,
    retries: Arc<RwLock<HashMap<String, RetryTask>>>,
    fail_writes: AtomicBool,
}

impl MockOtpQueue {
    pub fn new() -> Self {
        Self {
            pending: Arc::new(RwLock::new(HashMap::new())),
            retries: Arc::new(RwLock::new(HashMap::new())),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Make every following write fail with a storage error
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// TTL the pending item was stored with
    pub async fn pending_ttl(&self, tenant_id: &str, receiver: &str) -> Option<Duration> {
        let pending = self.pending.read().await;
        pending
            .get(&OtpQueueItem::key_for(tenant_id, receiver))
            .map(|(_, ttl)| *ttl)
    }

    /// Stored retry task regardless of its due time
    pub async fn retry_task(&self, tenant_id: &str, receiver: &str) -> Option<RetryTask> {
        let retries = self.retries.read().await;
        retries.get(&RetryTask::key_for(tenant_id, receiver)).cloned()
    }

    pub async fn retry_count(&self) -> usize {
        self.retries.read().await.len()
    }

    /// Insert a task verbatim, bypassing count and due-time bookkeeping
    pub async fn insert_retry(&self, task: RetryTask) {
        self.retries.write().await.insert(task.key(), task);
    }

    fn check_writable(&self) -> DomainResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DomainError::storage("mock queue unavailable"));
        }
        Ok(())
    }
}

impl Default for MockOtpQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OtpQueue for MockOtpQueue {
    async fn enqueue(&self, item: &OtpQueueItem, ttl: Duration) -> DomainResult<()> {
        self.check_writable()?;
        self.pending
            .write()
            .await
            .insert(item.key(), (item.clone(), ttl));
        Ok(())
    }

    async fn get(&self, tenant_id: &str, receiver: &str) -> DomainResult<OtpQueueItem> {
        let key = OtpQueueItem::key_for(tenant_id, receiver);
        let pending = self.pending.read().await;
        pending
            .get(&key)
            .map(|(item, _)| item.clone())
            .ok_or_else(|| DomainError::not_found(key))
    }

    async fn delete(&self, tenant_id: &str, receiver: &str) -> DomainResult<()> {
        self.check_writable()?;
        self.pending
            .write()
            .await
            .remove(&OtpQueueItem::key_for(tenant_id, receiver));
        Ok(())
    }

    async fn enqueue_retry(&self, task: &RetryTask, delay: Duration) -> DomainResult<RetryTask> {
        self.check_writable()?;
        let mut retries = self.retries.write().await;
        let retry_count = retries
            .get(&task.key())
            .map_or(1, |existing| existing.retry_count + 1);
        let stored = task.scheduled(retry_count, Utc::now(), delay);
        retries.insert(stored.key(), stored.clone());
        Ok(stored)
    }

    async fn get_due_retry_tasks(&self, now: DateTime<Utc>) -> DomainResult<Vec<RetryTask>> {
        let retries = self.retries.read().await;
        Ok(retries.values().filter(|t| t.is_due(now)).cloned().collect())
    }

    async fn delete_retry(&self, tenant_id: &str, receiver: &str) -> DomainResult<()> {
        self.check_writable()?;
        self.retries
            .write()
            .await
            .remove(&RetryTask::key_for(tenant_id, receiver));
        Ok(())
    }
}
