//! Tests and shared mocks for the channel abstraction

pub(crate) mod mocks;
