//! Value objects shared by the courier and the workers.

pub mod retry_policy;

pub use retry_policy::RetryPolicy;
