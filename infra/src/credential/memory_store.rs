//! Process-local credential repository

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use oc_core::{
    ChannelCredential, ChannelType, CredentialCipher, CredentialRepository, DomainError,
    DomainResult, EncryptedCredential,
};

use super::credential_key;

/// Keeps sealed credentials in a map, for single-instance deployments and tests
pub struct MemoryCredentialRepository {
    channel: ChannelType,
    cipher: Arc<CredentialCipher>,
    records: RwLock<HashMap<String, EncryptedCredential>>,
}

impl MemoryCredentialRepository {
    pub fn new(channel: ChannelType, cipher: Arc<CredentialCipher>) -> Self {
        Self {
            channel,
            cipher,
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Sealed record as held by the store
    pub fn raw_record(&self, tenant_id: &str) -> Option<EncryptedCredential> {
        self.records
            .read()
            .get(&credential_key(self.channel, tenant_id))
            .cloned()
    }
}

#[async_trait]
impl CredentialRepository for MemoryCredentialRepository {
    async fn get(&self, tenant_id: &str) -> DomainResult<Option<ChannelCredential>> {
        match self.raw_record(tenant_id) {
            Some(record) => Ok(Some(self.cipher.decrypt(&record)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, credential: &ChannelCredential) -> DomainResult<()> {
        if credential.channel != self.channel {
            return Err(DomainError::Validation {
                message: format!(
                    "{} credential saved to the {} store",
                    credential.channel, self.channel
                ),
            });
        }
        let record = self.cipher.encrypt(credential)?;
        self.records
            .write()
            .insert(credential_key(self.channel, &credential.tenant_id), record);
        Ok(())
    }

    async fn get_all(&self) -> DomainResult<Vec<ChannelCredential>> {
        let records: Vec<EncryptedCredential> = self.records.read().values().cloned().collect();
        records.iter().map(|r| self.cipher.decrypt(r)).collect()
    }

    async fn delete(&self, tenant_id: &str) -> DomainResult<()> {
        self.records
            .write()
            .remove(&credential_key(self.channel, tenant_id));
        Ok(())
    }
}
