//! Amount and percentage handling for quote columns.

use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Parse a currency amount column (e.g. "$1,352.00", "58", "-12.50").
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let cleaned: String = s
        .trim()
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | ' ' | '\u{00a0}'))
        .collect();

    if cleaned.is_empty() {
        return None;
    }

    Decimal::from_str(&cleaned).ok()
}

/// Parse a percentage column with or without its `%` suffix.
pub fn parse_percent(s: &str) -> Option<Decimal> {
    parse_amount(s.trim().trim_end_matches('%'))
}

/// Format an amount as currency in the en-NZ style ($1,234.56).
pub fn format_currency(amount: Decimal, fraction_digits: u32) -> String {
    format_currency_with(amount, "$", fraction_digits)
}

/// Format an amount with an explicit currency symbol.
///
/// Midpoints round away from zero; negatives render as `-$12.00`.
pub fn format_currency_with(amount: Decimal, symbol: &str, fraction_digits: u32) -> String {
    let rounded =
        amount.round_dp_with_strategy(fraction_digits, RoundingStrategy::MidpointAwayFromZero);
    let negative = rounded < Decimal::ZERO;
    let s = format!("{:.*}", fraction_digits as usize, rounded.abs());

    let (integer_part, decimal_part) = match s.split_once('.') {
        Some((i, d)) => (i, Some(d)),
        None => (s.as_str(), None),
    };

    // Add thousand separators
    let chars: Vec<char> = integer_part.chars().collect();
    let mut formatted = String::new();
    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            formatted.push(',');
        }
        formatted.push(*c);
    }

    let sign = if negative { "-" } else { "" };
    match decimal_part {
        Some(d) => format!("{}{}{}.{}", sign, symbol, formatted, d),
        None => format!("{}{}{}", sign, symbol, formatted),
    }
}

/// Format a percentage with one decimal place (63.8%).
pub fn format_percent(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.1}%", rounded)
}
