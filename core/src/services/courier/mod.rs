//! Courier use case for OTP delivery
//!
//! This module ties the dispatch pipeline together:
//! - Admission through the fixed-window rate limiter
//! - Provider resolution per (tenant, channel)
//! - Pending item bookkeeping and the first delivery attempt
//! - Retry task scheduling and redelivery with exponential backoff

mod config;
mod service;
mod types;

#[cfg(test)]
mod tests;

pub use config::{CourierConfig, SendRateLimit};
pub use service::CourierService;
pub use types::{DispatchOutcome, OtpRequest, RedeliveryOutcome};
