//! # Money — Exact Two-Digit Decimal Amounts
//!
//! All monetary values in the tienda backend are exact decimals with two
//! fractional digits, matching the `NUMERIC(12,2)` columns they are stored
//! in. Floating point exists only at the JSON boundary and is converted
//! through [`Money::from_f64`] / [`Money::to_f64`] — never used for
//! arithmetic.
//!
//! Derived amounts (line extensions, tax) round half-up to two digits at
//! the point of computation, so a persisted total is always representable
//! exactly.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// An exact monetary amount with two fractional digits.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Zero amount.
    pub fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    /// Build from a decimal, rounding to two fractional digits half-up.
    pub fn from_decimal(amount: Decimal) -> Self {
        Self(amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
    }

    /// Build from whole currency units and hundredths, e.g. `(10, 50)` → 10.50.
    pub fn from_major_minor(major: i64, minor: u32) -> Self {
        Self::from_decimal(Decimal::new(major * 100 + minor as i64, 2))
    }

    /// Convert from the JSON boundary.
    ///
    /// # Errors
    ///
    /// Rejects non-finite values and values outside the decimal range.
    pub fn from_f64(value: f64) -> Result<Self, CoreError> {
        if !value.is_finite() {
            return Err(CoreError::InvalidAmount(value));
        }
        Decimal::from_f64_retain(value)
            .map(Self::from_decimal)
            .ok_or(CoreError::InvalidAmount(value))
    }

    /// Convert for the JSON boundary. Two-digit decimals are exactly
    /// representable in `f64` for any realistic amount.
    pub fn to_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or(0.0)
    }

    /// The inner decimal amount.
    pub fn amount(&self) -> Decimal {
        self.0
    }

    /// Multiply by a unit count (line extension: unit price × quantity).
    pub fn times(&self, quantity: u32) -> Self {
        Self::from_decimal(self.0 * Decimal::from(quantity))
    }

    /// Multiply by a fractional rate, rounding the result to two digits.
    pub fn at_rate(&self, rate: Decimal) -> Self {
        Self::from_decimal(self.0 * rate)
    }

    /// Whether the amount is strictly greater than zero.
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }
}

impl std::ops::Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl std::ops::AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl std::ops::Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self::from_decimal(amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_from_f64_rounds_to_two_digits() {
        let m = Money::from_f64(3.14159).unwrap();
        assert_eq!(m.to_string(), "3.14");
    }

    #[test]
    fn test_from_decimal_rounds_midpoints_away_from_zero() {
        // 10.005 exactly, which f64 cannot carry.
        let m = Money::from_decimal(Decimal::new(10_005, 3));
        assert_eq!(m.to_string(), "10.01");
    }

    #[test]
    fn test_from_f64_rejects_non_finite() {
        assert!(Money::from_f64(f64::NAN).is_err());
        assert!(Money::from_f64(f64::INFINITY).is_err());
    }

    #[test]
    fn test_line_extension() {
        let unit = Money::from_major_minor(10, 0);
        assert_eq!(unit.times(3), Money::from_major_minor(30, 0));
    }

    #[test]
    fn test_tax_at_21_percent_is_exact() {
        let subtotal = Money::from_major_minor(30, 0);
        let taxes = subtotal.at_rate(Decimal::new(21, 2));
        assert_eq!(taxes, Money::from_major_minor(6, 30));
        assert_eq!((subtotal + taxes).to_string(), "36.30");
    }

    #[test]
    fn test_round_trip_through_f64() {
        let m = Money::from_major_minor(1234, 56);
        assert_eq!(Money::from_f64(m.to_f64()).unwrap(), m);
    }

    #[test]
    fn test_display_always_two_digits() {
        assert_eq!(Money::from_major_minor(5, 0).to_string(), "5.00");
        assert_eq!(Money::zero().to_string(), "0.00");
    }
}
