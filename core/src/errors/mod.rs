//! Domain error taxonomy for the dispatch and retry subsystem.

use thiserror::Error;

use crate::domain::entities::ChannelType;

/// Core domain errors
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// Queue or repository miss. A normal outcome, not logged as an error.
    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    /// Vendor 5xx, network failure or any other retryable delivery failure
    #[error("Transient send failure on {channel}: {message}")]
    TransientSendFailure { channel: ChannelType, message: String },

    /// Vendor reported an invalid or expired credential
    #[error("Credential rejected by {channel}")]
    AuthExpired { channel: ChannelType },

    /// Missing endpoint, credential or key. Never retried.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Admission denial
    #[error("Rate limit exceeded for {key}: {limit} attempts per {window_seconds}s")]
    RateLimitExceeded {
        key: String,
        limit: u64,
        window_seconds: u64,
    },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn not_found(resource: impl Into<String>) -> Self {
        DomainError::NotFound {
            resource: resource.into(),
        }
    }

    pub fn transient(channel: ChannelType, message: impl Into<String>) -> Self {
        DomainError::TransientSendFailure {
            channel,
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        DomainError::Configuration {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        DomainError::Storage {
            message: message.into(),
        }
    }

    /// Whether the error is a queue/repository miss
    pub fn is_not_found(&self) -> bool {
        matches!(self, DomainError::NotFound { .. })
    }

    /// Whether repeating the same operation may succeed without any other change
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            DomainError::TransientSendFailure { .. } | DomainError::Storage { .. }
        )
    }

    /// Whether a failed delivery should become a retry task
    pub fn is_retryable(&self) -> bool {
        self.is_transient() || matches!(self, DomainError::AuthExpired { .. })
    }
}

pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_classification() {
        assert!(DomainError::transient(ChannelType::Sms, "503").is_retryable());
        assert!(DomainError::AuthExpired { channel: ChannelType::ChatPlatform }.is_retryable());
        assert!(!DomainError::AuthExpired { channel: ChannelType::ChatPlatform }.is_transient());
        assert!(!DomainError::configuration("missing endpoint").is_retryable());
        assert!(!DomainError::not_found("otp").is_retryable());
        assert!(!DomainError::RateLimitExceeded {
            key: "k".to_string(),
            limit: 1,
            window_seconds: 60,
        }
        .is_retryable());
    }

    #[test]
    fn test_error_messages() {
        let err = DomainError::transient(ChannelType::Webhook, "connection reset");
        assert_eq!(err.to_string(), "Transient send failure on webhook: connection reset");

        let err = DomainError::not_found("otp:pending:acme:+15550001111");
        assert!(err.is_not_found());
        assert!(err.to_string().contains("otp:pending:acme"));
    }
}
