//! Credential repository trait for refreshed provider credentials.

use async_trait::async_trait;

use crate::domain::entities::ChannelCredential;
use crate::errors::DomainResult;

/// Persistence of channel credentials, one per tenant
///
/// A repository instance is bound to a single channel. Implementations keep
/// the token pair encrypted at rest and hand out decrypted values only.
#[async_trait]
pub trait CredentialRepository: Send + Sync {
    /// Credential for `tenant_id`, or `None` if nothing was stored yet
    async fn get(&self, tenant_id: &str) -> DomainResult<Option<ChannelCredential>>;

    /// Store `credential`, replacing any previous value for its tenant
    async fn save(&self, credential: &ChannelCredential) -> DomainResult<()>;

    /// Every stored credential
    async fn get_all(&self) -> DomainResult<Vec<ChannelCredential>>;

    /// Remove the credential for `tenant_id`. Idempotent.
    async fn delete(&self, tenant_id: &str) -> DomainResult<()>;
}
