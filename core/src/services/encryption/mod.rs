//! Encryption of provider credentials at rest

pub mod credential_cipher;

pub use credential_cipher::{CredentialCipher, EncryptedCredential};
