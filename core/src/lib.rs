//! # OtpCourier Core
//!
//! Core domain layer of the OTP dispatch service.
//! This crate contains the domain entities, the error taxonomy, the queue and
//! credential repository contracts, the fixed-window rate limiter, the channel
//! provider abstraction, the courier use case and the background workers.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::entities::{
    ChannelCredential, ChannelType, OtpQueueItem, RetryTask, TokenGrant, PENDING_KEY_PREFIX,
    RETRY_KEY_PREFIX,
};
pub use domain::value_objects::RetryPolicy;
pub use errors::{DomainError, DomainResult};
pub use repositories::{CredentialRepository, OtpQueue};
pub use services::{
    render_otp_message, retry_with_backoff, BackoffConfig, ChannelProvider, CounterStore,
    CourierConfig, CourierService, CredentialCipher, DispatchOutcome, EncryptedCredential,
    FixedWindowRateLimiter, OtpRequest, ProviderRegistry, RateLimitKey, RedeliveryOutcome,
    RefreshRunSummary, RetryRunSummary, RetryWorker, SendRateLimit, StaticProviderRegistry,
    TokenRefreshWorker,
};
