//! # Core Error Types
//!
//! Errors for the foundational types. Domain- and store-level errors live
//! in their own crates; this enum only covers failures constructing the
//! primitives themselves.

use thiserror::Error;

/// Errors from constructing core types.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// A JSON-boundary number could not be converted to an exact amount.
    #[error("invalid monetary amount: {0}")]
    InvalidAmount(f64),
}
