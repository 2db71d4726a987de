//! # Store Error Mapping
//!
//! Translates sqlx failures into the domain's error taxonomy. Postgres
//! reports constraint violations through SQLSTATE codes; the two this
//! store cares about are `23505` (unique violation, carrying the
//! constraint name) and `23503` (foreign key violation).

use thiserror::Error;

use tienda_domain::{CheckoutError, DomainError};

/// SQLSTATE for unique constraint violations.
const UNIQUE_VIOLATION: &str = "23505";
/// SQLSTATE for foreign key violations.
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Persistence-layer errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A checkout precondition failed (also raised when the transactional
    /// stock decrement detects a concurrent oversell).
    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    /// A domain invariant failed while decoding or transitioning a row.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// A row the operation needs does not exist.
    #[error("{entity} {key} not found")]
    RowNotFound {
        /// Entity kind, e.g. `"order"`.
        entity: &'static str,
        /// The missing key.
        key: i64,
    },

    /// A unique constraint rejected the write (duplicate email, category
    /// name, and so on).
    #[error("conflict: {0}")]
    Conflict(String),

    /// A foreign key constraint rejected the write (referenced row
    /// missing, or the row is still referenced).
    #[error("constraint violation: {0}")]
    ForeignKey(String),

    /// Document number generation kept colliding; bounded retries ran out.
    #[error("could not generate a unique {0} number")]
    NumberingExhausted(&'static str),

    /// Review creation without a matching purchase.
    #[error("review requires a purchase of the product in the given order by the given client")]
    UnverifiedPurchase,

    /// Any other database failure.
    #[error("persistence failure: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    /// Map a sqlx error, translating constraint violations.
    pub(crate) fn from_sqlx(err: sqlx::Error) -> Self {
        if let Some(db) = err.as_database_error() {
            let code = db.code().map(|c| c.to_string());
            match code.as_deref() {
                Some(UNIQUE_VIOLATION) => {
                    return Self::Conflict(
                        db.constraint().unwrap_or("unique constraint").to_string(),
                    )
                }
                Some(FOREIGN_KEY_VIOLATION) => {
                    return Self::ForeignKey(
                        db.constraint().unwrap_or("foreign key").to_string(),
                    )
                }
                _ => {}
            }
        }
        Self::Database(err)
    }

    /// Whether this is a unique violation against the named constraint.
    pub(crate) fn is_conflict_on(&self, constraint: &str) -> bool {
        matches!(self, Self::Conflict(c) if c == constraint)
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
