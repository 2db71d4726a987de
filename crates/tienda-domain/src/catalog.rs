//! # Catalog Types
//!
//! Products, categories, and reviews. The catalog owns stock truth: the
//! `stock` field here is a snapshot read from the store, and only the
//! checkout workflow and line-item reconciliation may change the stored
//! value.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tienda_core::{CategoryId, ClientId, Money, OrderId, ProductId, ReviewId};

use crate::error::DomainError;

/// A sellable product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Database key.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Current unit price. Historical orders capture their own copy.
    pub price: Money,
    /// Units available for reservation.
    pub stock: u32,
    /// Optional long description.
    pub description: Option<String>,
    /// Owning category, if categorized.
    pub category_id: Option<CategoryId>,
    /// Row creation instant.
    pub created_at: DateTime<Utc>,
    /// Last update instant, if any.
    pub updated_at: Option<DateTime<Utc>>,
}

/// A product category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// Database key.
    pub id: CategoryId,
    /// Unique category name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
}

/// A validated review rating, 1.0 to 5.0 inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rating(Decimal);

impl Rating {
    /// Validate and wrap a rating value.
    ///
    /// # Errors
    ///
    /// Rejects values outside 1.0..=5.0.
    pub fn new(value: Decimal) -> Result<Self, DomainError> {
        if value < Decimal::ONE || value > Decimal::from(5) {
            return Err(DomainError::RatingOutOfRange(value));
        }
        Ok(Self(value))
    }

    /// The inner value.
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }
}

/// A product review tied to a concrete purchase.
///
/// The `order_id` link is what makes reviews verifiable: creating one
/// requires that the order belongs to the reviewing client and contains
/// the reviewed product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    /// Database key.
    pub id: ReviewId,
    /// Star rating.
    pub rating: Rating,
    /// Optional free-text comment.
    pub comment: Option<String>,
    /// Reviewed product.
    pub product_id: ProductId,
    /// Reviewing client.
    pub client_id: ClientId,
    /// The purchase the review is tied to.
    pub order_id: OrderId,
    /// Row creation instant.
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_bounds() {
        assert!(Rating::new(Decimal::ONE).is_ok());
        assert!(Rating::new(Decimal::from(5)).is_ok());
        assert!(Rating::new(Decimal::new(45, 1)).is_ok());
        assert!(Rating::new(Decimal::new(9, 1)).is_err());
        assert!(Rating::new(Decimal::new(51, 1)).is_err());
    }
}
