//! Money calculation utilities using rust_decimal for precision
//!
//! Prices are stored as `f64`; sums are computed in `Decimal` and converted
//! back rounded to 2 decimal places.

use rust_decimal::prelude::*;

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Convert f64 to Decimal; non-finite input counts as zero
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_else(|| {
        tracing::error!(value = ?value, "Non-finite f64 in monetary calculation, defaulting to zero");
        Decimal::ZERO
    })
}

/// Convert Decimal back to f64, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// `price * quantity`
pub fn line_total(price: f64, quantity: i32) -> Decimal {
    to_decimal(price) * Decimal::from(quantity)
}

/// Sum of `(price, quantity)` pairs
pub fn order_total(lines: impl IntoIterator<Item = (f64, i32)>) -> f64 {
    let total = lines
        .into_iter()
        .fold(Decimal::ZERO, |acc, (price, quantity)| {
            acc + line_total(price, quantity)
        });
    to_f64(total)
}
