//! Unit tests for the background workers

mod retry_worker_tests;
mod token_refresh_tests;
