//! Request and outcome types for the courier service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::ChannelType;

/// One OTP issuance request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtpRequest {
    pub tenant_id: String,
    pub receiver: String,
    pub channel: ChannelType,
    /// Passcode generated by the caller
    pub otp: String,
}

impl OtpRequest {
    pub fn new(
        tenant_id: impl Into<String>,
        receiver: impl Into<String>,
        channel: ChannelType,
        otp: impl Into<String>,
    ) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            receiver: receiver.into(),
            channel,
            otp: otp.into(),
        }
    }
}

/// Result of the first delivery attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The vendor accepted the message
    Delivered { message_id: String },
    /// The first attempt failed and a retry task was scheduled
    Queued {
        ready_at: DateTime<Utc>,
        retry_count: u32,
    },
}

/// Result of one redelivery driven by the retry worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedeliveryOutcome {
    Delivered { message_id: String },
    /// Failed again and scheduled for a later attempt
    Rescheduled {
        ready_at: DateTime<Utc>,
        retry_count: u32,
    },
    /// Failed with the retry budget used up; the task was removed
    Abandoned { retry_count: u32 },
    /// No provider, or a failure retrying cannot fix; the task was removed
    Dropped,
}
