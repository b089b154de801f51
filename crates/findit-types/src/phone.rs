//! Phone number normalization for Ugandan numbers.
//!
//! Canonical form is digits only with the `256` country prefix, e.g.
//! `256712345678`. This is the form stored in `users.phone`.

pub const COUNTRY_CODE: &str = "256";

/// Normalize a user-entered phone number to its canonical form.
///
/// Non-digits are stripped first, so `+256 712-345 678` is accepted.
/// Returns `None` for any shape other than:
/// - `256XXXXXXXXX` (12 digits)
/// - `7XXXXXXXX` (9 digit local mobile)
/// - `07XXXXXXXX` (10 digits with trunk prefix)
pub fn normalize_phone(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();

    if digits.starts_with(COUNTRY_CODE) && digits.len() == 12 {
        Some(digits)
    } else if digits.starts_with('7') && digits.len() == 9 {
        Some(format!("{COUNTRY_CODE}{digits}"))
    } else if digits.starts_with("07") && digits.len() == 10 {
        Some(format!("{COUNTRY_CODE}{}", &digits[1..]))
    } else {
        None
    }
}
