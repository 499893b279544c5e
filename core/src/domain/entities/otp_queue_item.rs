//! Pending OTP entity awaiting confirmation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Key prefix of pending OTP entries
pub const PENDING_KEY_PREFIX: &str = "otp:pending";

/// One pending OTP, keyed by (tenant, receiver)
///
/// At most one item exists per key: enqueueing a new one replaces the previous.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtpQueueItem {
    /// Unique identifier of this issuance
    pub id: Uuid,

    /// Tenant namespace
    pub tenant_id: String,

    /// Phone number, email address or chat handle
    pub receiver: String,

    /// Rendered message body
    pub message: String,

    /// When the item was created
    pub created_at: DateTime<Utc>,
}

impl OtpQueueItem {
    pub fn new(
        tenant_id: impl Into<String>,
        receiver: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            tenant_id: tenant_id.into(),
            receiver: receiver.into(),
            message: message.into(),
            created_at: Utc::now(),
        }
    }

    /// Storage key for a (tenant, receiver) pair
    pub fn key_for(tenant_id: &str, receiver: &str) -> String {
        format!("{}:{}:{}", PENDING_KEY_PREFIX, tenant_id, receiver)
    }

    /// Storage key of this item
    pub fn key(&self) -> String {
        Self::key_for(&self.tenant_id, &self.receiver)
    }
}
