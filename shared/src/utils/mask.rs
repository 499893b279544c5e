//! Masking helpers for receiver addresses
//!
//! Receivers (phone numbers, email addresses, chat handles) are personal data
//! and must never reach the logs in clear text.

/// Number of trailing characters left visible when masking
const VISIBLE_SUFFIX: usize = 4;

/// Mask a receiver address for logging
///
/// Email addresses keep their first character and the domain, every other
/// receiver keeps only its last four characters (and a leading `+` when present).
///
/// # Example
///
/// ```
/// use oc_shared::mask::mask_receiver;
///
/// assert_eq!(mask_receiver("+1234567890"), "+******7890");
/// assert_eq!(mask_receiver("alice@example.com"), "a****@example.com");
/// ```
pub fn mask_receiver(receiver: &str) -> String {
    if let Some((local, domain)) = receiver.split_once('@') {
        return mask_email(local, domain);
    }

    let chars: Vec<char> = receiver.chars().collect();
    if chars.len() <= VISIBLE_SUFFIX {
        return "*".repeat(chars.len());
    }

    let last: String = chars[chars.len() - VISIBLE_SUFFIX..].iter().collect();
    let masked_count = chars.len() - VISIBLE_SUFFIX;

    if chars[0] == '+' {
        format!("+{}{}", "*".repeat(masked_count - 1), last)
    } else {
        format!("{}{}", "*".repeat(masked_count), last)
    }
}

fn mask_email(local: &str, domain: &str) -> String {
    match local.chars().next() {
        Some(first) => format!("{}****@{}", first, domain),
        None => format!("****@{}", domain),
    }
}
