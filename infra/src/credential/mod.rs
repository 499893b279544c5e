//! Credential repositories holding only ciphertext
//!
//! Records are sealed with [`oc_core::CredentialCipher`] before they reach the
//! store and opened again on read.

pub mod memory_store;
pub mod redis_store;

#[cfg(test)]
mod tests;

pub use memory_store::MemoryCredentialRepository;
pub use redis_store::RedisCredentialRepository;

use oc_core::ChannelType;

/// Key prefix of stored credentials
pub const CREDENTIAL_KEY_PREFIX: &str = "otp:credential";

/// Storage key for one tenant's credential on one channel
pub fn credential_key(channel: ChannelType, tenant_id: &str) -> String {
    format!("{}:{}:{}", CREDENTIAL_KEY_PREFIX, channel, tenant_id)
}
