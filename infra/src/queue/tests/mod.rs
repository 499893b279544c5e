//! Tests for the process-local queue backend
