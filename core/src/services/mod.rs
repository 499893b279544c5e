//! Business services containing the dispatch pipeline and its workers.

pub mod channel;
pub mod courier;
pub mod encryption;
pub mod rate_limit;
pub mod worker;

// Re-export commonly used types
pub use channel::{
    render_otp_message, retry_with_backoff, BackoffConfig, ChannelProvider, ProviderRegistry,
    StaticProviderRegistry,
};
pub use courier::{
    CourierConfig, CourierService, DispatchOutcome, OtpRequest, RedeliveryOutcome, SendRateLimit,
};
pub use encryption::{CredentialCipher, EncryptedCredential};
pub use rate_limit::{CounterStore, FixedWindowRateLimiter, RateLimitKey};
pub use worker::{RefreshRunSummary, RetryRunSummary, RetryWorker, TokenRefreshWorker};
