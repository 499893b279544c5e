//! Tests for credential repositories
