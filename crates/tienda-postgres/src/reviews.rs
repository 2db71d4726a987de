//! # Review Store
//!
//! Purchase-verified reviews. Creation checks that the named order
//! belongs to the reviewing client and contains the reviewed product;
//! a review without that purchase is rejected.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use tienda_core::{ClientId, OrderId, ProductId, ReviewId};
use tienda_domain::{Rating, Review};

use crate::error::{StoreError, StoreResult};

#[derive(sqlx::FromRow)]
struct ReviewRow {
    id_key: i64,
    rating: Decimal,
    comment: Option<String>,
    product_id: i64,
    client_id: i64,
    order_id: i64,
    created_at: DateTime<Utc>,
}

impl ReviewRow {
    fn into_review(self) -> StoreResult<Review> {
        Ok(Review {
            id: ReviewId::new(self.id_key),
            rating: Rating::new(self.rating)?,
            comment: self.comment,
            product_id: ProductId::new(self.product_id),
            client_id: ClientId::new(self.client_id),
            order_id: OrderId::new(self.order_id),
            created_at: self.created_at,
        })
    }
}

/// Store for product reviews.
#[derive(Clone)]
pub struct ReviewStore {
    pool: PgPool,
}

impl ReviewStore {
    /// Wrap a pool.
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a review after verifying the purchase.
    ///
    /// # Errors
    ///
    /// `UnverifiedPurchase` when the order does not belong to the client
    /// or does not contain the product.
    pub async fn create(
        &self,
        rating: Rating,
        comment: Option<&str>,
        product: ProductId,
        client: ClientId,
        order: OrderId,
    ) -> StoreResult<Review> {
        let purchased: bool = sqlx::query_scalar(
            "SELECT EXISTS(
                 SELECT 1 FROM orders o
                 JOIN order_details d ON d.order_id = o.id_key
                 WHERE o.id_key = $1 AND o.client_id = $2 AND d.product_id = $3)",
        )
        .bind(order.as_i64())
        .bind(client.as_i64())
        .bind(product.as_i64())
        .fetch_one(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)?;
        if !purchased {
            return Err(StoreError::UnverifiedPurchase);
        }

        let row = sqlx::query_as::<_, ReviewRow>(
            "INSERT INTO reviews (rating, comment, product_id, client_id, order_id)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id_key, rating, comment, product_id, client_id, order_id, created_at",
        )
        .bind(rating.as_decimal())
        .bind(comment)
        .bind(product.as_i64())
        .bind(client.as_i64())
        .bind(order.as_i64())
        .fetch_one(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)?;
        row.into_review()
    }

    /// Fetch a review by key.
    pub async fn get(&self, id: ReviewId) -> StoreResult<Review> {
        let row = sqlx::query_as::<_, ReviewRow>(
            "SELECT id_key, rating, comment, product_id, client_id, order_id, created_at
             FROM reviews WHERE id_key = $1",
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)?
        .ok_or(StoreError::RowNotFound {
            entity: "review",
            key: id.as_i64(),
        })?;
        row.into_review()
    }

    /// List a product's reviews, newest first.
    pub async fn list_for_product(
        &self,
        product: ProductId,
        skip: i64,
        limit: i64,
    ) -> StoreResult<Vec<Review>> {
        let rows = sqlx::query_as::<_, ReviewRow>(
            "SELECT id_key, rating, comment, product_id, client_id, order_id, created_at
             FROM reviews WHERE product_id = $1
             ORDER BY created_at DESC, id_key DESC OFFSET $2 LIMIT $3",
        )
        .bind(product.as_i64())
        .bind(skip)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)?;
        rows.into_iter().map(ReviewRow::into_review).collect()
    }

    /// Delete a review.
    pub async fn delete(&self, id: ReviewId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM reviews WHERE id_key = $1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::RowNotFound {
                entity: "review",
                key: id.as_i64(),
            });
        }
        Ok(())
    }
}
