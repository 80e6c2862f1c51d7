//! Spreadsheet-style quantity input.
//!
//! Cell edits never fail: anything that is not a non-negative decimal becomes
//! zero, and accepted values are rounded to two places.

use std::str::FromStr;

use rust_decimal::{prelude::FromPrimitive, Decimal, RoundingStrategy};
use tracing::debug;

const SCALE: u32 = 2;

/// A raw cell value, either typed text or an already-numeric value.
#[derive(Debug, Clone, PartialEq)]
pub enum RawQuantity {
    Text(String),
    Number(Decimal),
}

impl RawQuantity {
    /// Resolves the raw value to a stored quantity.
    pub fn resolve(&self) -> Decimal {
        match self {
            RawQuantity::Text(text) => parse_quantity(text),
            RawQuantity::Number(value) => normalize_quantity(*value),
        }
    }
}

impl From<&str> for RawQuantity {
    fn from(value: &str) -> Self {
        RawQuantity::Text(value.to_string())
    }
}

impl From<String> for RawQuantity {
    fn from(value: String) -> Self {
        RawQuantity::Text(value)
    }
}

impl From<Decimal> for RawQuantity {
    fn from(value: Decimal) -> Self {
        RawQuantity::Number(value)
    }
}

impl From<i64> for RawQuantity {
    fn from(value: i64) -> Self {
        RawQuantity::Number(Decimal::from(value))
    }
}

impl From<f64> for RawQuantity {
    fn from(value: f64) -> Self {
        // NaN and infinities have no decimal form.
        RawQuantity::Number(Decimal::from_f64(value).unwrap_or(Decimal::ZERO))
    }
}

/// Parses user text as a quantity, coercing invalid input to zero.
pub fn parse_quantity(raw: &str) -> Decimal {
    let trimmed = raw.trim();
    match Decimal::from_str(trimmed).or_else(|_| Decimal::from_scientific(trimmed)) {
        Ok(value) => normalize_quantity(value),
        Err(_) => {
            debug!(input = raw, "non-numeric quantity coerced to zero");
            Decimal::ZERO
        }
    }
}

/// Rounds to two places and clamps negatives to zero.
pub fn normalize_quantity(value: Decimal) -> Decimal {
    if value.is_sign_negative() {
        if !value.is_zero() {
            debug!(%value, "negative quantity coerced to zero");
        }
        return Decimal::ZERO;
    }
    value.round_dp_with_strategy(SCALE, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn parses_plain_decimals() {
        assert_eq!(parse_quantity(" 12 "), dec!(12));
        assert_eq!(parse_quantity("3.456"), dec!(3.46));
        assert_eq!(parse_quantity("0.005"), dec!(0.01));
    }

    #[test]
    fn invalid_input_becomes_zero() {
        assert_eq!(parse_quantity("abc"), Decimal::ZERO);
        assert_eq!(parse_quantity(""), Decimal::ZERO);
        assert_eq!(parse_quantity("-4"), Decimal::ZERO);
    }

    #[test]
    fn numeric_values_are_normalized() {
        assert_eq!(RawQuantity::from(7_i64).resolve(), dec!(7));
        assert_eq!(RawQuantity::from(2.5_f64).resolve(), dec!(2.5));
        assert_eq!(RawQuantity::from(f64::NAN).resolve(), Decimal::ZERO);
    }
}
