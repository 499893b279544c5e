//! Redis credential repository shared by all instances

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

use oc_core::{
    ChannelCredential, ChannelType, CredentialCipher, CredentialRepository, DomainError,
    DomainResult, EncryptedCredential,
};

use crate::cache::RedisClient;

use super::{credential_key, CREDENTIAL_KEY_PREFIX};

/// Sealed credentials under `otp:credential:<channel>:<tenant>`, without expiry
pub struct RedisCredentialRepository {
    channel: ChannelType,
    cipher: Arc<CredentialCipher>,
    client: Arc<RedisClient>,
}

impl RedisCredentialRepository {
    pub fn new(channel: ChannelType, cipher: Arc<CredentialCipher>, client: Arc<RedisClient>) -> Self {
        Self {
            channel,
            cipher,
            client,
        }
    }

    fn open(&self, raw: &str) -> DomainResult<ChannelCredential> {
        let record: EncryptedCredential = serde_json::from_str(raw)?;
        self.cipher.decrypt(&record)
    }
}

#[async_trait]
impl CredentialRepository for RedisCredentialRepository {
    async fn get(&self, tenant_id: &str) -> DomainResult<Option<ChannelCredential>> {
        let key = credential_key(self.channel, tenant_id);
        match self.client.get(&key).await? {
            Some(raw) => Ok(Some(self.open(&raw)?)),
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
        let raw = serde_json::to_string(&record)?;
        self.client
            .set(&credential_key(self.channel, &credential.tenant_id), &raw)
            .await?;
        debug!(
            tenant_id = %credential.tenant_id,
            channel = %self.channel,
            key_id = %record.key_id,
            event = "credential_persisted"
        );
        Ok(())
    }

    async fn get_all(&self) -> DomainResult<Vec<ChannelCredential>> {
        let pattern = format!("{}:{}:*", CREDENTIAL_KEY_PREFIX, self.channel);
        let mut credentials = Vec::new();

        for key in self.client.scan_match(&pattern).await? {
            let Some(raw) = self.client.get(&key).await? else {
                continue;
            };
            match self.open(&raw) {
                Ok(credential) => credentials.push(credential),
                Err(e) => warn!(key = %key, error = %e, event = "credential_unreadable"),
            }
        }

        Ok(credentials)
    }

    async fn delete(&self, tenant_id: &str) -> DomainResult<()> {
        self.client
            .delete(&credential_key(self.channel, tenant_id))
            .await?;
        Ok(())
    }
}
