//! Channel provider abstraction
//!
//! This module defines the contract every notification channel implements:
//! - OTP delivery with a shared message template
//! - Credential refresh for channels with expiring tokens
//! - Resolution of (tenant, channel) to a provider instance
//! - Exponential backoff for transient vendor failures

mod backoff;
mod registry;
mod template;
mod traits;

#[cfg(test)]
pub(crate) mod tests;

pub use backoff::{retry_with_backoff, BackoffConfig};
pub use registry::StaticProviderRegistry;
pub use template::render_otp_message;
pub use traits::{ChannelProvider, ProviderRegistry};
