//! Domain entities representing queued OTPs, retry tasks and channel credentials.

pub mod channel;
pub mod credential;
pub mod otp_queue_item;
pub mod retry_task;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use channel::ChannelType;
pub use credential::{ChannelCredential, TokenGrant};
pub use otp_queue_item::{OtpQueueItem, PENDING_KEY_PREFIX};
pub use retry_task::{RetryTask, RETRY_KEY_PREFIX};
