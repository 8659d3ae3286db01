//! Free-text helpers for the storefront workflow: quantity extraction,
//! price formatting and phone number validation.
//!
//! The only input channel a messaging UI offers is free text, so quantity
//! parsing is intentionally lenient: the first run of decimal digits anywhere
//! in the message counts ("10", "10 ta", "olaman 10 dona" all parse to 10).

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref DIGITS: Regex = Regex::new(r"\d+").expect("digit pattern should be valid");
    static ref PHONE: Regex =
        Regex::new(r"^\+998\d{9}$").expect("phone pattern should be valid");
}

/// Extract the first run of decimal digits from free text.
///
/// Returns `None` when the text carries no digits at all, and also when the
/// digit run overflows `i64` (a run that long is never a real quantity).
pub fn parse_quantity(text: &str) -> Option<i64> {
    DIGITS.find(text)?.as_str().parse::<i64>().ok()
}

/// Group an integer price with thousands separators for display.
///
/// Internal values stay raw integers; only the rendered text is grouped.
pub fn format_price(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, c) in digits.chars().enumerate() {
        let remaining = digits.len() - i;
        if i > 0 && remaining % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if value < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Validate a manually typed phone number: `+998` followed by nine digits.
pub fn check_phone(phone: &str) -> bool {
    PHONE.is_match(phone)
}

/// Normalize a phone number shared via a Telegram contact card, which may
/// arrive without the leading `+`.
pub fn fix_phone(phone: &str) -> String {
    if phone.starts_with('+') {
        phone.to_string()
    } else {
        format!("+{phone}")
    }
}

/// Build a Google Maps link for a latitude/longitude pair stored as
/// "lat,lon".
pub fn maps_link(location: &str) -> String {
    format!("https://www.google.com/maps?q={location}")
}
