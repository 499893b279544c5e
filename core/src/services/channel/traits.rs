//! Traits for channel providers and their registry

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;

use crate::domain::entities::ChannelType;
use crate::errors::DomainResult;

/// One notification channel, bound to a tenant's configuration
#[async_trait]
pub trait ChannelProvider: Send + Sync {
    /// Deliver `otp` to `receiver`, rendered with the shared template
    ///
    /// # Returns
    /// * `Ok(String)` - Vendor message identifier
    /// * `Err(DomainError::TransientSendFailure)` - Vendor 5xx or network failure
    /// * `Err(DomainError::Configuration)` - Missing endpoint or credential
    async fn send_otp(
        &self,
        tenant_id: &str,
        receiver: &str,
        otp: &str,
        ttl: Duration,
    ) -> DomainResult<String>;

    /// Obtain and persist a new credential. A no-op for static credentials.
    async fn refresh_credential(&self, tenant_id: &str) -> DomainResult<()>;

    fn channel_type(&self) -> ChannelType;

    /// Whether the provider is configured well enough to attempt a send
    async fn health_check(&self) -> bool;

    /// Expiry of the live credential; `None` for static or unknown expiry
    fn credential_expires_at(&self) -> Option<DateTime<Utc>> {
        None
    }
}

/// Maps (tenant, channel) to a long-lived provider instance
pub trait ProviderRegistry: Send + Sync {
    fn resolve(&self, tenant_id: &str, channel: ChannelType) -> Option<Arc<dyn ChannelProvider>>;

    /// Providers whose channel has expiring credentials, with their tenant
    fn stateful_providers(&self) -> Vec<(String, Arc<dyn ChannelProvider>)>;
}
