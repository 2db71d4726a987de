//! # Domain Error Types
//!
//! Errors raised by domain-type construction and state transitions. The
//! checkout workflow has its own taxonomy in [`crate::checkout`]; this enum
//! covers everything else.

use rust_decimal::Decimal;
use thiserror::Error;

use tienda_core::ClientId;

use crate::order::OrderStatus;

/// Errors from domain type construction and transitions.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// A wire-format numeric code did not name a known enum variant.
    #[error("unknown {kind} code: {code}")]
    UnknownCode {
        /// Which enum was being decoded.
        kind: &'static str,
        /// The offending code.
        code: i16,
    },

    /// An order status transition violated the lifecycle rules.
    #[error("invalid order status transition from {from} to {to}")]
    InvalidTransition {
        /// Current status.
        from: OrderStatus,
        /// Attempted target status.
        to: OrderStatus,
    },

    /// A review rating fell outside the permitted range.
    #[error("rating {0} outside the 1.0..=5.0 range")]
    RatingOutOfRange(Decimal),

    /// A tax rate fell outside the permitted range.
    #[error("tax rate {0} outside the 0..1 range")]
    TaxRateOutOfRange(Decimal),

    /// Attempted to soft-delete a client twice.
    #[error("{0} is already deleted")]
    AlreadyDeleted(ClientId),
}
