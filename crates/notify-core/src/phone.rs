//! Uzbek phone number normalization.
//!
//! The gateway expects numbers in the bare international form
//! `998XXXXXXXXX` (no `+`, no separators). User input arrives in every
//! imaginable shape, so all entry points normalize first.

/// Reserved number that never reaches the gateway. Store reviewers sign in
/// with it and receive [`crate::code::TEST_CODE`] instead of a real SMS.
pub const TEST_NUMBER: &str = "998999999999";

/// Normalizes a phone number to the `998XXXXXXXXX` form the gateway expects.
///
/// Rules, applied to the digits of the input in order:
/// - already starts with `998`: returned as-is
/// - ten digits starting with `8` (domestic `8 XX ...`): `8` replaced by `998`
/// - nine digits starting with `9` (bare operator prefix): `998` prepended
///
/// Anything else is returned as bare digits with a warning; the gateway
/// will reject it and the error surfaces to the caller.
pub fn normalize_phone(raw: &str) -> String {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();

    if digits.starts_with("998") {
        return digits;
    }
    if digits.len() == 10 && digits.starts_with('8') {
        return format!("998{}", &digits[1..]);
    }
    if digits.len() == 9 && digits.starts_with('9') {
        return format!("998{}", digits);
    }

    tracing::warn!("unrecognized phone number format: {}", raw);
    digits
}

/// True when `phone` normalizes to the reserved review number.
pub fn is_test_number(phone: &str) -> bool {
    normalize_phone(phone) == TEST_NUMBER
}
