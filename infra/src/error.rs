//! Infrastructure-specific error types

use oc_core::DomainError;

/// Failures raised by stores and vendor clients
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Redis cache error
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// HTTP request error for channel vendors
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<InfrastructureError> for DomainError {
    fn from(err: InfrastructureError) -> Self {
        match err {
            InfrastructureError::Cache(e) => DomainError::storage(e.to_string()),
            InfrastructureError::Http(e) => DomainError::Internal {
                message: format!("HTTP client error: {}", e),
            },
            InfrastructureError::Config(message) => DomainError::configuration(message),
            InfrastructureError::Serialization(e) => DomainError::Serialization(e),
        }
    }
}
