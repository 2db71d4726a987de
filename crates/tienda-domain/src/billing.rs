//! # Billing Derivation
//!
//! Computes and shapes the bill for a persisted order: subtotal from the
//! order total, taxes at a configured rate, optional discount. One bill
//! per order, enforced by the store's unique constraint; this module only
//! does the arithmetic.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tienda_core::{BillId, ClientId, Money, OrderId};

use crate::error::DomainError;
use crate::numbering::BillNumber;
use crate::order::Order;

/// A validated fractional tax rate in `[0, 1)`.
///
/// The historically observed rate is 21%; it is configuration, not a
/// constant baked into the arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaxRate(Decimal);

impl TaxRate {
    /// Validate and wrap a fractional rate.
    ///
    /// # Errors
    ///
    /// Rejects rates outside `[0, 1)`.
    pub fn new(rate: Decimal) -> Result<Self, DomainError> {
        if rate < Decimal::ZERO || rate >= Decimal::ONE {
            return Err(DomainError::TaxRateOutOfRange(rate));
        }
        Ok(Self(rate))
    }

    /// The inner fraction.
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }
}

impl Default for TaxRate {
    /// The default 21% rate.
    fn default() -> Self {
        Self(Decimal::new(21, 2))
    }
}

/// How a bill is settled. Wire codes 1..=4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentType {
    /// Cash on delivery or pickup.
    Cash,
    /// Credit card.
    CreditCard,
    /// Debit card.
    DebitCard,
    /// Bank transfer.
    Transfer,
}

impl PaymentType {
    /// The numeric wire/storage code.
    pub fn code(&self) -> i16 {
        match self {
            Self::Cash => 1,
            Self::CreditCard => 2,
            Self::DebitCard => 3,
            Self::Transfer => 4,
        }
    }

    /// Decode a wire/storage code.
    ///
    /// # Errors
    ///
    /// Rejects unknown codes.
    pub fn from_code(code: i16) -> Result<Self, DomainError> {
        match code {
            1 => Ok(Self::Cash),
            2 => Ok(Self::CreditCard),
            3 => Ok(Self::DebitCard),
            4 => Ok(Self::Transfer),
            _ => Err(DomainError::UnknownCode {
                kind: "payment type",
                code,
            }),
        }
    }
}

/// A computed bill, ready to persist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillDraft {
    /// Generated unique bill number.
    pub bill_number: BillNumber,
    /// Billed order.
    pub order_id: OrderId,
    /// Billed client.
    pub client_id: ClientId,
    /// The order total.
    pub subtotal: Money,
    /// Taxes on the subtotal.
    pub taxes: Money,
    /// Discount applied. Defaults to zero.
    pub discount: Money,
    /// `subtotal + taxes - discount`.
    pub total: Money,
    /// Settlement method.
    pub payment_type: PaymentType,
    /// Billing instant.
    pub date: DateTime<Utc>,
}

impl BillDraft {
    /// Derive a bill from a persisted order.
    pub fn derive(
        order: &Order,
        tax_rate: TaxRate,
        discount: Money,
        payment_type: PaymentType,
        at: DateTime<Utc>,
    ) -> Self {
        let subtotal = order.total;
        let taxes = subtotal.at_rate(tax_rate.as_decimal());
        let total = subtotal + taxes - discount;
        Self {
            bill_number: BillNumber::generate(at),
            order_id: order.id,
            client_id: order.client_id,
            subtotal,
            taxes,
            discount,
            total,
            payment_type,
            date: at,
        }
    }
}

/// A persisted bill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bill {
    /// Database key.
    pub id: BillId,
    /// Unique bill number.
    pub bill_number: BillNumber,
    /// Billed order. Unique: one bill per order.
    pub order_id: OrderId,
    /// Billed client.
    pub client_id: ClientId,
    /// The order total at billing time.
    pub subtotal: Money,
    /// Taxes on the subtotal.
    pub taxes: Money,
    /// Discount applied.
    pub discount: Money,
    /// Final amount due.
    pub total: Money,
    /// Settlement method.
    pub payment_type: PaymentType,
    /// Billing instant.
    pub date: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numbering::OrderNumber;
    use crate::order::{DeliveryMethod, OrderStatus};

    fn order(total: Money) -> Order {
        Order {
            id: OrderId::new(1),
            order_number: OrderNumber::from_stored("ORD-20260807-1234".to_string()),
            date: Utc::now(),
            total,
            delivery_method: DeliveryMethod::Standard,
            status: OrderStatus::Pending,
            client_id: ClientId::new(1),
            bill_id: None,
        }
    }

    #[test]
    fn test_default_rate_is_21_percent() {
        assert_eq!(TaxRate::default().as_decimal(), Decimal::new(21, 2));
    }

    #[test]
    fn test_tax_rate_bounds() {
        assert!(TaxRate::new(Decimal::ZERO).is_ok());
        assert!(TaxRate::new(Decimal::new(99, 2)).is_ok());
        assert!(TaxRate::new(Decimal::ONE).is_err());
        assert!(TaxRate::new(Decimal::new(-1, 2)).is_err());
    }

    #[test]
    fn test_derivation_at_default_rate() {
        // Order total 30.00 at 21%: bill total 36.30.
        let draft = BillDraft::derive(
            &order(Money::from_major_minor(30, 0)),
            TaxRate::default(),
            Money::zero(),
            PaymentType::Cash,
            Utc::now(),
        );
        assert_eq!(draft.subtotal, Money::from_major_minor(30, 0));
        assert_eq!(draft.taxes, Money::from_major_minor(6, 30));
        assert_eq!(draft.total, Money::from_major_minor(36, 30));
    }

    #[test]
    fn test_discount_is_subtracted_after_tax() {
        let draft = BillDraft::derive(
            &order(Money::from_major_minor(100, 0)),
            TaxRate::default(),
            Money::from_major_minor(21, 0),
            PaymentType::Transfer,
            Utc::now(),
        );
        assert_eq!(draft.total, Money::from_major_minor(100, 0));
    }

    #[test]
    fn test_zero_rate_bills_the_subtotal() {
        let draft = BillDraft::derive(
            &order(Money::from_major_minor(30, 0)),
            TaxRate::new(Decimal::ZERO).unwrap(),
            Money::zero(),
            PaymentType::Cash,
            Utc::now(),
        );
        assert_eq!(draft.taxes, Money::zero());
        assert_eq!(draft.total, Money::from_major_minor(30, 0));
    }

    #[test]
    fn test_payment_type_codes_round_trip() {
        for p in [
            PaymentType::Cash,
            PaymentType::CreditCard,
            PaymentType::DebitCard,
            PaymentType::Transfer,
        ] {
            assert_eq!(PaymentType::from_code(p.code()).unwrap(), p);
        }
        assert!(PaymentType::from_code(0).is_err());
        assert!(PaymentType::from_code(5).is_err());
    }
}
