//! Unit tests for the courier service

mod service_tests;
