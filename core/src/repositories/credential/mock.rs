//! Mock implementation of CredentialRepository for testing

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::entities::ChannelCredential;
use crate::errors::DomainResult;

use super::r#trait::CredentialRepository;

/// Mock credential repository for testing
pub struct MockCredentialRepository {
    credentials: Arc<RwLock<HashMap<String, ChannelCredential>>>,
    saves: AtomicUsize,
}

impl MockCredentialRepository {
    pub fn new() -> Self {
        Self {
            credentials: Arc::new(RwLock::new(HashMap::new())),
            saves: AtomicUsize::new(0),
        }
    }

    /// Number of `save` calls observed
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl Default for MockCredentialRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialRepository for MockCredentialRepository {
    async fn get(&self, tenant_id: &str) -> DomainResult<Option<ChannelCredential>> {
        Ok(self.credentials.read().await.get(tenant_id).cloned())
    }

    async fn save(&self, credential: &ChannelCredential) -> DomainResult<()> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        self.credentials
            .write()
            .await
            .insert(credential.tenant_id.clone(), credential.clone());
        Ok(())
    }

    async fn get_all(&self) -> DomainResult<Vec<ChannelCredential>> {
        Ok(self.credentials.read().await.values().cloned().collect())
    }

    async fn delete(&self, tenant_id: &str) -> DomainResult<()> {
        self.credentials.write().await.remove(tenant_id);
        Ok(())
    }
}
