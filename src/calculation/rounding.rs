//! Monetary rounding helpers.
//!
//! Every line amount is rounded to one decimal place, half away from zero,
//! at the point it is assigned. Totals are exact sums of rounded lines.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds an amount to one decimal place, half away from zero.
///
/// # Examples
///
/// ```
/// use ctc_breakdown::calculation::round_amount;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// assert_eq!(round_amount(Decimal::from_str("5357.148").unwrap()), Decimal::from_str("5357.1").unwrap());
/// assert_eq!(round_amount(Decimal::from_str("0.05").unwrap()), Decimal::from_str("0.1").unwrap());
/// ```
pub fn round_amount(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
}

/// Returns `percent`% of `base`, unrounded.
pub fn percent_of(percent: Decimal, base: Decimal) -> Decimal {
    base * percent / Decimal::ONE_HUNDRED
}
