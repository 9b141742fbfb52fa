//! Locale-independent number and timestamp rendering.

use chrono::{DateTime, Local, Utc};

/// Fraction digits shown for calculator results.
pub const CALCULATOR_DIGITS: usize = 10;
/// Fraction digits shown on the "1 FROM = x TO" line.
pub const RATE_DIGITS: usize = 4;
/// Fraction digits shown for converted amounts.
pub const AMOUNT_DIGITS: usize = 2;

/// Renders `value` with at most `max_digits` fraction digits, dropping
/// trailing zeros. Integral values have no fraction part at all.
pub fn trimmed(value: f64, max_digits: usize) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let mut text = format!("{value:.max_digits$}");
    if text.contains('.') {
        let len = text.trim_end_matches('0').trim_end_matches('.').len();
        text.truncate(len);
    }
    if text == "-0" {
        text = "0".to_string();
    }
    text
}

/// Renders `value` with exactly `digits` fraction digits.
pub fn fixed(value: f64, digits: usize) -> String {
    if !value.is_finite() {
        return format!("{:.digits$}", 0.0);
    }
    let text = format!("{value:.digits$}");
    // "-0.00" reads oddly next to a zero amount
    if text.starts_with('-') && text[1..].chars().all(|c| c == '0' || c == '.') {
        return text[1..].to_string();
    }
    text
}

pub fn last_updated(timestamp: &DateTime<Utc>) -> String {
    timestamp
        .with_timezone(&Local)
        .format("%d.%m.%Y, %H:%M")
        .to_string()
}
