//! AES-256-GCM protection of channel credentials at rest

use aes_gcm::{
    aead::{Aead, KeyInit, Payload},
    Aes256Gcm, Key, Nonce,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::{DateTime, Utc};
use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::domain::entities::{ChannelCredential, ChannelType};
use crate::errors::{DomainError, DomainResult};

const KEY_LEN: usize = 32;
const NONCE_LEN: usize = 12;

/// Stored form of a credential: the token pair is ciphertext, metadata is clear
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedCredential {
    pub tenant_id: String,
    pub channel: ChannelType,
    /// Token pair ciphertext (base64 encoded)
    pub ciphertext: String,
    /// Per-record random nonce (base64 encoded)
    pub nonce: String,
    /// Identifier of the key the record was sealed with
    pub key_id: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Serialize, Deserialize)]
struct TokenPair {
    access_token: String,
    refresh_token: String,
}

/// Seals and opens credentials with a single AES-256 key
///
/// The tenant and channel are bound as associated data, so a record copied
/// under another tenant's key fails to decrypt.
pub struct CredentialCipher {
    cipher: Aes256Gcm,
    key_id: String,
}

impl CredentialCipher {
    /// Create from raw key bytes; the key must be exactly 32 bytes
    pub fn new(key: &[u8]) -> DomainResult<Self> {
        if key.len() != KEY_LEN {
            return Err(DomainError::configuration(format!(
                "Credential encryption key must be {} bytes, got {}",
                KEY_LEN,
                key.len()
            )));
        }

        let digest = hex::encode(Sha256::digest(key));
        Ok(Self {
            cipher: Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key)),
            key_id: digest[..16].to_string(),
        })
    }

    /// Create from a base64 encoded key
    pub fn from_base64(encoded: &str) -> DomainResult<Self> {
        let key = BASE64.decode(encoded.trim()).map_err(|e| {
            DomainError::configuration(format!("Credential encryption key is not base64: {}", e))
        })?;
        Self::new(&key)
    }

    /// Create with a freshly generated random key
    ///
    /// Records sealed with a generated key cannot be opened after a restart.
    pub fn generate() -> Self {
        let mut key = [0u8; KEY_LEN];
        OsRng.fill_bytes(&mut key);
        let digest = hex::encode(Sha256::digest(key));
        Self {
            cipher: Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key)),
            key_id: digest[..16].to_string(),
        }
    }

    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    pub fn encrypt(&self, credential: &ChannelCredential) -> DomainResult<EncryptedCredential> {
        let plaintext = serde_json::to_vec(&TokenPair {
            access_token: credential.access_token.clone(),
            refresh_token: credential.refresh_token.clone(),
        })?;

        let mut nonce = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce);

        let aad = associated_data(&credential.tenant_id, credential.channel);
        let ciphertext = self
            .cipher
            .encrypt(
                Nonce::from_slice(&nonce),
                Payload {
                    msg: &plaintext,
                    aad: aad.as_bytes(),
                },
            )
            .map_err(|e| DomainError::Internal {
                message: format!("Credential encryption failed: {}", e),
            })?;

        Ok(EncryptedCredential {
            tenant_id: credential.tenant_id.clone(),
            channel: credential.channel,
            ciphertext: BASE64.encode(ciphertext),
            nonce: BASE64.encode(nonce),
            key_id: self.key_id.clone(),
            issued_at: credential.issued_at,
            expires_at: credential.expires_at,
        })
    }

    pub fn decrypt(&self, record: &EncryptedCredential) -> DomainResult<ChannelCredential> {
        if record.key_id != self.key_id {
            return Err(DomainError::configuration(format!(
                "Credential for tenant {} was sealed with key {}, active key is {}",
                record.tenant_id, record.key_id, self.key_id
            )));
        }

        let nonce = decode_field(&record.nonce, "nonce")?;
        if nonce.len() != NONCE_LEN {
            return Err(DomainError::Internal {
                message: "Invalid nonce size for AES-GCM".to_string(),
            });
        }
        let ciphertext = decode_field(&record.ciphertext, "ciphertext")?;

        let aad = associated_data(&record.tenant_id, record.channel);
        let plaintext = self
            .cipher
            .decrypt(
                Nonce::from_slice(&nonce),
                Payload {
                    msg: &ciphertext,
                    aad: aad.as_bytes(),
                },
            )
            .map_err(|e| DomainError::Internal {
                message: format!("Credential decryption failed: {}", e),
            })?;

        let tokens: TokenPair = serde_json::from_slice(&plaintext)?;
        Ok(ChannelCredential {
            tenant_id: record.tenant_id.clone(),
            channel: record.channel,
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            issued_at: record.issued_at,
            expires_at: record.expires_at,
        })
    }
}

fn associated_data(tenant_id: &str, channel: ChannelType) -> String {
    format!("{}:{}", channel, tenant_id)
}

fn decode_field(value: &str, field: &str) -> DomainResult<Vec<u8>> {
    BASE64.decode(value).map_err(|e| DomainError::Internal {
        message: format!("Invalid base64 in credential {}: {}", field, e),
    })
}
