//! Scheduled re-delivery of a failed OTP send.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::channel::ChannelType;

/// Key prefix of retry task entries
pub const RETRY_KEY_PREFIX: &str = "otp:retry";

/// One scheduled re-delivery, keyed by (tenant, receiver)
///
/// `retry_count` is 0 for a task that has never been enqueued. The queue sets
/// it to 1 on the first enqueue and increments it on every further enqueue of
/// the same key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryTask {
    pub tenant_id: String,

    pub receiver: String,

    pub channel: ChannelType,

    /// OTP payload handed back to the provider on redelivery
    pub message: String,

    pub retry_count: u32,

    /// Due time; the task is eligible once `ready_at <= now`
    pub ready_at: DateTime<Utc>,
}

impl RetryTask {
    pub fn new(
        tenant_id: impl Into<String>,
        receiver: impl Into<String>,
        channel: ChannelType,
        message: impl Into<String>,
    ) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            receiver: receiver.into(),
            channel,
            message: message.into(),
            retry_count: 0,
            ready_at: Utc::now(),
        }
    }

    /// Storage key for a (tenant, receiver) pair
    pub fn key_for(tenant_id: &str, receiver: &str) -> String {
        format!("{}:{}:{}", RETRY_KEY_PREFIX, tenant_id, receiver)
    }

    /// Storage key of this task
    pub fn key(&self) -> String {
        Self::key_for(&self.tenant_id, &self.receiver)
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.ready_at <= now
    }

    /// Copy of this task scheduled `delay` after `now` with the given count
    pub fn scheduled(&self, retry_count: u32, now: DateTime<Utc>, delay: Duration) -> Self {
        let delay = chrono::Duration::from_std(delay).unwrap_or_else(|_| chrono::Duration::days(365));
        Self {
            retry_count,
            ready_at: now.checked_add_signed(delay).unwrap_or(DateTime::<Utc>::MAX_UTC),
            ..self.clone()
        }
    }
}
