//! # Order Types and Status Machine
//!
//! Order headers, line items, and the two wire-coded enums: delivery
//! method and order status. Statuses move through a small validated
//! machine:
//!
//! ```text
//! Pending ──▶ Processing ──▶ Completed
//!    │             │
//!    └─────────────┴──▶ Cancelled (terminal)
//! ```
//!
//! Completed and Cancelled are terminal. Transitions are validated at
//! runtime with [`OrderStatus::transition`]; there are too few states to
//! justify typestates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tienda_core::{BillId, ClientId, Money, OrderDetailId, OrderId, ProductId};

use crate::error::DomainError;
use crate::numbering::OrderNumber;

/// How an order reaches the customer. Wire codes 1..=3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMethod {
    /// Carrier delivery at the standard tier.
    Standard,
    /// Customer pickup at a store.
    Pickup,
    /// Expedited carrier delivery.
    Express,
}

impl DeliveryMethod {
    /// The numeric wire/storage code.
    pub fn code(&self) -> i16 {
        match self {
            Self::Standard => 1,
            Self::Pickup => 2,
            Self::Express => 3,
        }
    }

    /// Decode a wire/storage code.
    ///
    /// # Errors
    ///
    /// Rejects unknown codes.
    pub fn from_code(code: i16) -> Result<Self, DomainError> {
        match code {
            1 => Ok(Self::Standard),
            2 => Ok(Self::Pickup),
            3 => Ok(Self::Express),
            _ => Err(DomainError::UnknownCode {
                kind: "delivery method",
                code,
            }),
        }
    }
}

/// Order lifecycle status. Wire codes 1..=4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Placed, not yet picked up by fulfilment.
    Pending,
    /// Being prepared or shipped.
    Processing,
    /// Delivered or handed over. Terminal.
    Completed,
    /// Cancelled before completion. Terminal.
    Cancelled,
}

impl OrderStatus {
    /// The numeric wire/storage code.
    pub fn code(&self) -> i16 {
        match self {
            Self::Pending => 1,
            Self::Processing => 2,
            Self::Completed => 3,
            Self::Cancelled => 4,
        }
    }

    /// Decode a wire/storage code.
    ///
    /// # Errors
    ///
    /// Rejects unknown codes.
    pub fn from_code(code: i16) -> Result<Self, DomainError> {
        match code {
            1 => Ok(Self::Pending),
            2 => Ok(Self::Processing),
            3 => Ok(Self::Completed),
            4 => Ok(Self::Cancelled),
            _ => Err(DomainError::UnknownCode {
                kind: "order status",
                code,
            }),
        }
    }

    /// Whether the machine allows moving to `next` from here.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Processing)
                | (Self::Pending, Self::Cancelled)
                | (Self::Processing, Self::Completed)
                | (Self::Processing, Self::Cancelled)
        )
    }

    /// Validate a transition, returning the new status.
    ///
    /// # Errors
    ///
    /// Rejects transitions the machine does not allow, including
    /// self-transitions and anything out of a terminal state.
    pub fn transition(&self, next: OrderStatus) -> Result<OrderStatus, DomainError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(DomainError::InvalidTransition {
                from: *self,
                to: next,
            })
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// An order header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Database key.
    pub id: OrderId,
    /// Human-readable unique number, generated at placement.
    pub order_number: OrderNumber,
    /// Placement instant.
    pub date: DateTime<Utc>,
    /// Sum of line extensions. Always recomputed server-side.
    pub total: Money,
    /// Delivery method chosen at placement.
    pub delivery_method: DeliveryMethod,
    /// Current lifecycle status.
    pub status: OrderStatus,
    /// Ordering client.
    pub client_id: ClientId,
    /// Linked bill, once billing derivation has succeeded.
    pub bill_id: Option<BillId>,
}

/// One line item of an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderDetail {
    /// Database key.
    pub id: OrderDetailId,
    /// Owning order.
    pub order_id: OrderId,
    /// Ordered product.
    pub product_id: ProductId,
    /// Units ordered. Positive.
    pub quantity: u32,
    /// Unit price captured at order time; later catalog price changes do
    /// not touch it.
    pub price: Money,
}

impl OrderDetail {
    /// Extended price of the line: unit price times quantity.
    pub fn extended(&self) -> Money {
        self.price.times(self.quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delivery_method_codes_round_trip() {
        for m in [
            DeliveryMethod::Standard,
            DeliveryMethod::Pickup,
            DeliveryMethod::Express,
        ] {
            assert_eq!(DeliveryMethod::from_code(m.code()).unwrap(), m);
        }
        assert!(DeliveryMethod::from_code(0).is_err());
        assert!(DeliveryMethod::from_code(4).is_err());
    }

    #[test]
    fn test_status_codes_round_trip() {
        for s in [
            OrderStatus::Pending,
            OrderStatus::Processing,
            OrderStatus::Completed,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(OrderStatus::from_code(s.code()).unwrap(), s);
        }
        assert!(OrderStatus::from_code(5).is_err());
    }

    #[test]
    fn test_forward_transitions() {
        let s = OrderStatus::Pending;
        let s = s.transition(OrderStatus::Processing).unwrap();
        let s = s.transition(OrderStatus::Completed).unwrap();
        assert_eq!(s, OrderStatus::Completed);
    }

    #[test]
    fn test_cancellation_paths() {
        assert!(OrderStatus::Pending
            .transition(OrderStatus::Cancelled)
            .is_ok());
        assert!(OrderStatus::Processing
            .transition(OrderStatus::Cancelled)
            .is_ok());
    }

    #[test]
    fn test_terminal_states_reject_everything() {
        for terminal in [OrderStatus::Completed, OrderStatus::Cancelled] {
            for next in [
                OrderStatus::Pending,
                OrderStatus::Processing,
                OrderStatus::Completed,
                OrderStatus::Cancelled,
            ] {
                assert!(terminal.transition(next).is_err());
            }
        }
    }

    #[test]
    fn test_no_backward_or_skipping_transitions() {
        assert!(OrderStatus::Pending
            .transition(OrderStatus::Completed)
            .is_err());
        assert!(OrderStatus::Processing
            .transition(OrderStatus::Pending)
            .is_err());
    }

    #[test]
    fn test_line_extension() {
        let line = OrderDetail {
            id: OrderDetailId::new(1),
            order_id: OrderId::new(1),
            product_id: ProductId::new(1),
            quantity: 3,
            price: Money::from_major_minor(10, 0),
        };
        assert_eq!(line.extended(), Money::from_major_minor(30, 0));
    }
}
