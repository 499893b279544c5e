//! Background workers
//!
//! Two independent periodic schedulers run next to the request path:
//! - [`RetryWorker`] re-drives due retry tasks through the courier
//! - [`TokenRefreshWorker`] refreshes channel credentials before they expire
//!
//! Both observe a shared `CancellationToken` and stop without waiting for
//! in-flight vendor calls.

mod retry_worker;
mod token_refresh;
mod types;

#[cfg(test)]
mod tests;

pub use retry_worker::RetryWorker;
pub use token_refresh::TokenRefreshWorker;
pub use types::{RefreshRunSummary, RetryRunSummary};

use std::time::Duration;

/// Period used when a worker is started with a zero interval
const FALLBACK_TICK: Duration = Duration::from_secs(1);

/// `tokio::time::interval` panics on a zero period
fn tick_period(interval: Duration) -> Duration {
    if interval.is_zero() {
        FALLBACK_TICK
    } else {
        interval
    }
}
