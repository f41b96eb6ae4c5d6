//! Percent normalization at the data boundary
//!
//! Stored assumptions are percent units (5 means 5%). They are divided by 100
//! exactly once, here, and the engine only ever sees fractions.

use crate::error::{BudgetError, Result};
use log::warn;
use rust_decimal::prelude::*;

/// Lowest percent any stored assumption is expected to take
pub const MIN_PERCENT: f64 = -100.0;

/// Highest percent any stored assumption is expected to take
pub const MAX_PERCENT: f64 = 1000.0;

/// Convert percent units to a fraction
pub fn to_fraction(percent: f64) -> f64 {
    percent / 100.0
}

/// Convert a fraction back to percent units for display
pub fn to_percent(fraction: f64) -> f64 {
    fraction * 100.0
}

/// Parse a numeric field from external text.
///
/// Blank means absent and reads as 0. Anything else that is not a finite
/// number is rejected. Every loader goes through this function so all call
/// sites coerce identically.
pub fn parse_number(field: &str, raw: &str) -> Result<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(0.0);
    }

    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(BudgetError::NonNumeric {
            field: field.to_string(),
            value: raw.to_string(),
        }),
    }
}

/// Parse a numeric field as an exact decimal.
///
/// Accepts and rejects exactly what [`parse_number`] does; the decimal is then
/// read from the text itself so no binary rounding creeps in.
pub fn parse_decimal(field: &str, raw: &str) -> Result<Decimal> {
    let value = parse_number(field, raw)?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(Decimal::ZERO);
    }
    if let Ok(exact) = Decimal::from_str(trimmed) {
        return Ok(exact);
    }

    // Scientific notation and the like
    Decimal::from_f64(value).ok_or_else(|| BudgetError::NonNumeric {
        field: field.to_string(),
        value: raw.to_string(),
    })
}

/// Parse a percent-unit field; values outside the expected range are kept but logged
pub fn parse_percent(field: &str, raw: &str) -> Result<f64> {
    let percent = parse_number(field, raw)?;
    if !(MIN_PERCENT..=MAX_PERCENT).contains(&percent) {
        warn!("{} = {}% is outside the expected range", field, percent);
    }
    Ok(percent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_blank_is_zero() {
        assert_eq!(parse_number("Percent", "").unwrap(), 0.0);
        assert_eq!(parse_number("Percent", "   ").unwrap(), 0.0);
    }

    #[test]
    fn test_non_numeric_rejected() {
        assert!(matches!(
            parse_number("Percent", "abc"),
            Err(BudgetError::NonNumeric { .. })
        ));
        assert!(parse_number("Percent", "NaN").is_err());
        assert!(parse_number("Percent", "inf").is_err());
    }

    #[test]
    fn test_percent_divided_once() {
        let percent = parse_percent("Percent", "5").unwrap();
        assert_relative_eq!(percent, 5.0);
        assert_relative_eq!(to_fraction(percent), 0.05);
        assert_relative_eq!(to_fraction(parse_percent("Percent", " 0.5 ").unwrap()), 0.005);
        assert_relative_eq!(to_percent(to_fraction(12.5)), 12.5);
    }

    #[test]
    fn test_decimal_is_exact() {
        use rust_decimal_macros::dec;
        assert_eq!(parse_decimal("Revenue", "1234.5678").unwrap(), dec!(1234.5678));
        assert_eq!(parse_decimal("Revenue", "").unwrap(), Decimal::ZERO);
        assert_eq!(parse_decimal("Revenue", "1e3").unwrap(), dec!(1000));
        assert!(matches!(
            parse_decimal("Revenue", "n/a"),
            Err(BudgetError::NonNumeric { .. })
        ));
    }

    #[test]
    fn test_out_of_range_is_kept() {
        assert_relative_eq!(parse_percent("Percent", "1500").unwrap(), 1500.0);
    }

    #[test]
    fn test_decimal_and_number_agree_on_acceptance() {
        for raw in ["1_000", "1,000", " 5 ", "+5", ".5", "12.25", "1e3", "", "abc", "inf", "-3"] {
            let number = parse_number("Revenue", raw);
            let decimal = parse_decimal("Revenue", raw);
            assert_eq!(number.is_ok(), decimal.is_ok(), "disagree on {:?}", raw);
            if let (Ok(number), Ok(decimal)) = (number, decimal) {
                assert_relative_eq!(decimal.to_f64().unwrap(), number);
            }
        }
    }
}
