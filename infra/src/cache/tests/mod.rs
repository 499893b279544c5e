//! Tests for the cache layer
