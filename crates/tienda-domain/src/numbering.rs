//! # Document Numbering
//!
//! Human-readable unique numbers for orders (`ORD-YYYYMMDD-NNNN`) and
//! bills (`FACT-YYYYMMDD-NNNN`). The suffix is random, so collisions
//! within a day are possible; uniqueness is enforced by the database and
//! the caller regenerates on a constraint violation. Generation is NOT
//! request-keyed, which is why placement is not idempotent.

use chrono::{DateTime, NaiveDate, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Width of the random numeric suffix.
const SUFFIX_RANGE: u32 = 10_000;

/// A generated order number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderNumber(String);

impl OrderNumber {
    /// Generate a number for the given placement instant.
    pub fn generate(at: DateTime<Utc>) -> Self {
        Self::generate_with(at.date_naive(), &mut rand::thread_rng())
    }

    /// Generate with an explicit date and RNG. Used by tests.
    pub fn generate_with(date: NaiveDate, rng: &mut impl Rng) -> Self {
        Self(format!(
            "ORD-{}-{:04}",
            date.format("%Y%m%d"),
            rng.gen_range(0..SUFFIX_RANGE)
        ))
    }

    /// Wrap a stored value read back from the database.
    pub fn from_stored(value: String) -> Self {
        Self(value)
    }

    /// The printable form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A generated bill number. The `FACT-` prefix is the billing document
/// namespace; the shape otherwise matches order numbers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BillNumber(String);

impl BillNumber {
    /// Generate a number for the given billing instant.
    pub fn generate(at: DateTime<Utc>) -> Self {
        Self::generate_with(at.date_naive(), &mut rand::thread_rng())
    }

    /// Generate with an explicit date and RNG. Used by tests.
    pub fn generate_with(date: NaiveDate, rng: &mut impl Rng) -> Self {
        Self(format!(
            "FACT-{}-{:04}",
            date.format("%Y%m%d"),
            rng.gen_range(0..SUFFIX_RANGE)
        ))
    }

    /// Wrap a stored value read back from the database.
    pub fn from_stored(value: String) -> Self {
        Self(value)
    }

    /// The printable form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BillNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 7).unwrap()
    }

    #[test]
    fn test_order_number_shape() {
        let n = OrderNumber::generate_with(date(), &mut StepRng::new(0, 1));
        assert_eq!(n.as_str(), "ORD-20260807-0000");
    }

    #[test]
    fn test_bill_number_shape() {
        let n = BillNumber::generate_with(date(), &mut StepRng::new(0, 1));
        assert_eq!(n.as_str(), "FACT-20260807-0000");
    }

    #[test]
    fn test_suffix_is_zero_padded() {
        let n = OrderNumber::generate(Utc::now());
        let suffix = n.as_str().rsplit('-').next().unwrap();
        assert_eq!(suffix.len(), 4);
        assert!(suffix.chars().all(|c| c.is_ascii_digit()));
    }
}
