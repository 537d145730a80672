//! Exact decimal amounts and base-unit scaling
//!
//! Amounts are parsed into [`BigDecimal`] and scaled with integer powers of
//! ten, so `0.1 ETH` is exactly `100000000000000000` wei.

use crate::error::{Error, Result};
use bigdecimal::num_bigint::{BigInt, Sign};
use bigdecimal::{BigDecimal, RoundingMode, Zero};
use std::fmt;
use std::str::FromStr;

/// A non-negative decimal quantity as typed by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Amount {
    value: BigDecimal,
    raw: String,
}

impl Amount {
    /// Parse a decimal string. Negative, non-numeric and non-finite input is rejected.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let value = BigDecimal::from_str(trimmed)
            .map_err(|_| Error::InvalidAmount(format!("'{raw}' is not a decimal number")))?;

        if value.sign() == Sign::Minus {
            return Err(Error::InvalidAmount(format!("'{raw}' is negative")));
        }
        let value = if value.is_zero() { BigDecimal::zero() } else { value };
        check_bounds(&value).map_err(|e| Error::InvalidAmount(format!("'{raw}' {e}")))?;

        Ok(Self {
            value,
            raw: trimmed.to_string(),
        })
    }

    /// Decimal value
    pub fn value(&self) -> &BigDecimal {
        &self.value
    }

    /// True when the amount is exactly zero
    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    /// `floor(amount * 10^decimals)`
    pub fn to_base_units(&self, decimals: u32) -> BigInt {
        to_base_units(&self.value, decimals)
    }
}

impl FromStr for Amount {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self> {
        Self::parse(raw)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Most integer digits an accepted value may carry (a uint256 has 78).
pub const MAX_INTEGER_DIGITS: i64 = 78;

/// Most fractional digits an accepted value may carry.
pub const MAX_FRACTION_DIGITS: i64 = 255;

/// Reject magnitudes whose base-unit scaling would build oversized integers.
///
/// Exponent notation makes `1e9000000000` a three-character input, so the
/// check runs on digit counts and never expands the value.
pub fn check_bounds(value: &BigDecimal) -> std::result::Result<(), String> {
    if value.is_zero() {
        return Ok(());
    }

    let (_, scale) = value.as_bigint_and_exponent();
    let digits = i64::try_from(value.digits()).unwrap_or(i64::MAX);
    if digits.saturating_sub(scale) > MAX_INTEGER_DIGITS {
        return Err(format!("has more than {MAX_INTEGER_DIGITS} integer digits"));
    }
    if scale > MAX_FRACTION_DIGITS {
        return Err(format!("has more than {MAX_FRACTION_DIGITS} decimal places"));
    }
    Ok(())
}

/// `10^decimals` as an exact decimal
fn pow10(decimals: u32) -> BigDecimal {
    BigDecimal::new(BigInt::from(1), -i64::from(decimals))
}

/// Scale a non-negative decimal to base units, truncating toward zero.
pub fn to_base_units(value: &BigDecimal, decimals: u32) -> BigInt {
    let (units, _) = (value.clone() * pow10(decimals))
        .with_scale_round(0, RoundingMode::Down)
        .into_bigint_and_exponent();
    units
}

/// Inverse of [`to_base_units`]: `units / 10^decimals`.
pub fn from_base_units(units: &BigInt, decimals: u32) -> BigDecimal {
    BigDecimal::new(units.clone(), i64::from(decimals))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn units(s: &str) -> BigInt {
        BigInt::from_str(s).unwrap()
    }

    #[test]
    fn scales_whole_amounts_exactly() {
        let five = Amount::parse("5").unwrap();
        assert_eq!(five.to_base_units(18), units("5000000000000000000"));
        assert_eq!(five.to_base_units(6), units("5000000"));
    }

    #[test]
    fn point_one_ether_is_exact() {
        let amount = Amount::parse("0.1").unwrap();
        assert_eq!(amount.to_base_units(18), units("100000000000000000"));
    }

    #[test]
    fn excess_precision_truncates_toward_zero() {
        let amount = Amount::parse("1.9999999").unwrap();
        assert_eq!(amount.to_base_units(6), units("1999999"));

        let dust = Amount::parse("0.0000009").unwrap();
        assert_eq!(dust.to_base_units(6), units("0"));
    }

    #[test]
    fn rejects_bad_input() {
        for raw in ["-1", "-0.5", "abc", "", "NaN", "inf", "Infinity", "1.2.3", "0x10"] {
            let err = Amount::parse(raw).unwrap_err();
            assert!(matches!(err, Error::InvalidAmount(_)), "{raw:?}");
        }
    }

    #[test]
    fn oversized_exponents_are_rejected_before_scaling() {
        for raw in ["1e9000000000", "1e200000000", "1e-9000000000", "1e79", "-1e9000000000"] {
            let err = Amount::parse(raw).unwrap_err();
            assert!(matches!(err, Error::InvalidAmount(_)), "{raw:?}");
        }

        let widest = format!("{}.{}", "9".repeat(78), "1".repeat(255));
        assert!(Amount::parse(&widest).is_ok());
        assert!(Amount::parse(&format!("{widest}1")).is_err());
    }

    #[test]
    fn exponent_notation_within_bounds_scales() {
        let amount = Amount::parse("2.5e3").unwrap();
        assert_eq!(amount.to_base_units(6), units("2500000000"));

        let zero = Amount::parse("0e-999999999").unwrap();
        assert!(zero.is_zero());
        assert_eq!(zero.to_base_units(18), units("0"));
    }

    #[test]
    fn keeps_typed_text_for_display() {
        let amount = Amount::parse("0.10").unwrap();
        assert_eq!(amount.to_string(), "0.10");
        assert_eq!(amount, Amount::parse("0.10").unwrap());
        assert!(Amount::parse("0").unwrap().is_zero());
    }

    #[test]
    fn base_units_recover_the_amount() {
        for (raw, decimals) in [
            ("0.1", 18),
            ("5", 6),
            ("123.456789", 6),
            ("0.000000000000000001", 18),
        ] {
            let amount = Amount::parse(raw).unwrap();
            let recovered = from_base_units(&amount.to_base_units(decimals), decimals);
            assert_eq!(&recovered, amount.value(), "{raw} @ {decimals}");
        }
    }
}
