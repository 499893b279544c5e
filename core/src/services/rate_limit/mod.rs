//! Fixed-window rate limiting shared by every OTP issuance entry point
//!
//! Counters live in a [`CounterStore`], so the same limiter works over the
//! process-local cache and over Redis.

mod limiter;
mod traits;

#[cfg(test)]
pub(crate) mod tests;

pub use limiter::{FixedWindowRateLimiter, RateLimitKey};
pub use traits::CounterStore;
