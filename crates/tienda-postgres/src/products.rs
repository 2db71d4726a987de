//! # Product Store
//!
//! Catalog CRUD. Direct stock edits through [`ProductStore::update`] are
//! the catalog-maintenance path; reservations always go through the
//! checkout workflow or line-item reconciliation instead.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use tienda_core::{CategoryId, Money, ProductId};
use tienda_domain::Product;

use crate::count_from_db;
use crate::error::{StoreError, StoreResult};

pub(crate) const PRODUCT_COLUMNS: &str =
    "id_key, name, price, stock, description, category_id, created_at, updated_at";

#[derive(sqlx::FromRow)]
pub(crate) struct ProductRow {
    id_key: i64,
    name: String,
    price: Decimal,
    stock: i32,
    description: Option<String>,
    category_id: Option<i64>,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl ProductRow {
    pub(crate) fn into_product(self) -> Product {
        Product {
            id: ProductId::new(self.id_key),
            name: self.name,
            price: Money::from_decimal(self.price),
            stock: count_from_db(self.stock),
            description: self.description,
            category_id: self.category_id.map(CategoryId::new),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Input for catalog creation.
#[derive(Debug, Clone)]
pub struct NewProduct {
    /// Display name.
    pub name: String,
    /// Unit price. Positive.
    pub price: Money,
    /// Initial stock.
    pub stock: u32,
    /// Optional description.
    pub description: Option<String>,
    /// Owning category, if any.
    pub category_id: Option<CategoryId>,
}

/// Partial update; `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct ProductUpdate {
    /// New name.
    pub name: Option<String>,
    /// New unit price.
    pub price: Option<Money>,
    /// New absolute stock level (catalog edit, not a reservation).
    pub stock: Option<u32>,
    /// New description.
    pub description: Option<String>,
    /// New category.
    pub category_id: Option<CategoryId>,
}

/// Store for catalog products.
#[derive(Clone)]
pub struct ProductStore {
    pool: PgPool,
}

impl ProductStore {
    /// Wrap a pool.
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// `ForeignKey` when the category does not exist.
    pub async fn create(&self, input: NewProduct) -> StoreResult<Product> {
        let row = sqlx::query_as::<_, ProductRow>(
            "INSERT INTO products (name, price, stock, description, category_id)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id_key, name, price, stock, description, category_id, created_at, updated_at",
        )
        .bind(&input.name)
        .bind(input.price.amount())
        .bind(input.stock as i32)
        .bind(&input.description)
        .bind(input.category_id.map(|c| c.as_i64()))
        .fetch_one(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)?;
        Ok(row.into_product())
    }

    /// Fetch a product by key.
    pub async fn get(&self, id: ProductId) -> StoreResult<Product> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id_key = $1"
        ))
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)?
        .ok_or(StoreError::RowNotFound {
            entity: "product",
            key: id.as_i64(),
        })?;
        Ok(row.into_product())
    }

    /// List products, optionally restricted to a category.
    pub async fn list(
        &self,
        category: Option<CategoryId>,
        skip: i64,
        limit: i64,
    ) -> StoreResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products
             WHERE ($1::BIGINT IS NULL OR category_id = $1)
             ORDER BY id_key OFFSET $2 LIMIT $3"
        ))
        .bind(category.map(|c| c.as_i64()))
        .bind(skip)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)?;
        Ok(rows.into_iter().map(ProductRow::into_product).collect())
    }

    /// Apply a partial update.
    pub async fn update(&self, id: ProductId, update: ProductUpdate) -> StoreResult<Product> {
        let row = sqlx::query_as::<_, ProductRow>(
            "UPDATE products
             SET name = COALESCE($2, name),
                 price = COALESCE($3, price),
                 stock = COALESCE($4, stock),
                 description = COALESCE($5, description),
                 category_id = COALESCE($6, category_id),
                 updated_at = now()
             WHERE id_key = $1
             RETURNING id_key, name, price, stock, description, category_id, created_at, updated_at",
        )
        .bind(id.as_i64())
        .bind(&update.name)
        .bind(update.price.map(|p| p.amount()))
        .bind(update.stock.map(|s| s as i32))
        .bind(&update.description)
        .bind(update.category_id.map(|c| c.as_i64()))
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)?
        .ok_or(StoreError::RowNotFound {
            entity: "product",
            key: id.as_i64(),
        })?;
        Ok(row.into_product())
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// `ForeignKey` when historical line items still reference it.
    pub async fn delete(&self, id: ProductId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM products WHERE id_key = $1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::RowNotFound {
                entity: "product",
                key: id.as_i64(),
            });
        }
        Ok(())
    }
}
