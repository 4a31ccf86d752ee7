//! Number and duration formatting.

use crate::state::{PriceMove, price_scale, round_price};
use chrono::Duration;
use rust_decimal::Decimal;

/// Format a price for display.
///
/// Prices below 1 use 4 fractional digits, everything else 2 fractional digits with
/// thousands separators.
pub fn format_price(price: Decimal) -> String {
    let scale = price_scale(price);
    let fixed = format_fixed(price, scale);

    if scale == 2 {
        add_thousands_separators(&fixed)
    } else {
        fixed
    }
}

/// Format a decimal with exactly `scale` fractional digits, rounding half away from zero.
pub fn format_fixed(value: Decimal, scale: u32) -> String {
    let rounded = round_price(value, scale);
    format!("{:.*}", scale as usize, rounded)
}

/// Insert a comma every three integer digits (`1234567.5` -> `1,234,567.5`).
pub fn add_thousands_separators(number: &str) -> String {
    let (sign, unsigned) = match number.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", number),
    };
    let (integer, fraction) = match unsigned.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    match fraction {
        Some(fraction) => format!("{}{}.{}", sign, grouped, fraction),
        None => format!("{}{}", sign, grouped),
    }
}

/// Format the signed price move of the history column (`+1.00`, `-0.0025`).
pub fn format_move(price_move: PriceMove) -> String {
    let sign = if price_move.delta.is_sign_negative() && !price_move.delta.is_zero() {
        '-'
    } else {
        '+'
    };
    format!(
        "{}{}",
        sign,
        format_fixed(price_move.delta.abs(), price_move.scale)
    )
}

/// Format a percentage magnitude with 2 decimals (`1.234` -> `1.23`).
pub fn format_percent(percent: Decimal) -> String {
    format_fixed(percent.abs(), 2)
}

/// Format a non-negative duration compactly (`42s`, `3m 05s`, `2h 10m`).
pub fn format_age(age: Duration) -> String {
    let total = age.num_seconds().max(0);
    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);

    if hours > 0 {
        format!("{}h {:02}m", hours, minutes)
    } else if minutes > 0 {
        format!("{}m {:02}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}
