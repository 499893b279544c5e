//! Tests for the OTP queue contract
