//! Message body shared by every channel

use std::time::Duration;

/// Render the OTP message; the lifetime is rounded up to whole minutes, at least one
pub fn render_otp_message(otp: &str, ttl: Duration) -> String {
    let minutes = ttl.as_secs().div_ceil(60).max(1);
    format!(
        "Your verification code is {}. It expires in {} minutes.",
        otp, minutes
    )
}
