//! # Line-Item Mutation and Stock Reconciliation
//!
//! Mutating a line item changes what an order has reserved, so every
//! operation here moves product stock in the same transaction as the
//! row change, and recomputes the owning order's total afterwards:
//!
//! - create: reserve the quantity (conditional decrement), insert.
//! - quantity increase: reserve the delta.
//! - quantity decrease: release the delta.
//! - delete: release the whole reserved quantity, remove the row.
//!
//! The detail row is locked (`FOR UPDATE`) for the duration, so two
//! concurrent mutations of the same line cannot interleave their
//! read-modify-write sequences.

use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};

use tienda_core::{Money, OrderDetailId, OrderId, ProductId};
use tienda_domain::{CheckoutError, OrderDetail};

use crate::count_from_db;
use crate::error::{StoreError, StoreResult};
use crate::orders::OrderDetailRow;

/// Store for individual order line items.
#[derive(Clone)]
pub struct OrderDetailStore {
    pool: PgPool,
}

impl OrderDetailStore {
    /// Wrap a pool.
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetch a line item by key.
    pub async fn get(&self, id: OrderDetailId) -> StoreResult<OrderDetail> {
        let row = sqlx::query_as::<_, OrderDetailRow>(
            "SELECT id_key, order_id, product_id, quantity, price
             FROM order_details WHERE id_key = $1",
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)?
        .ok_or(StoreError::RowNotFound {
            entity: "order detail",
            key: id.as_i64(),
        })?;
        Ok(row.into_detail())
    }

    /// List line items across orders.
    pub async fn list(&self, skip: i64, limit: i64) -> StoreResult<Vec<OrderDetail>> {
        let rows = sqlx::query_as::<_, OrderDetailRow>(
            "SELECT id_key, order_id, product_id, quantity, price
             FROM order_details ORDER BY id_key OFFSET $1 LIMIT $2",
        )
        .bind(skip)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)?;
        Ok(rows.into_iter().map(OrderDetailRow::into_detail).collect())
    }

    /// Add a line item to an existing order, reserving its stock and
    /// capturing the product's current price.
    pub async fn create(
        &self,
        order: OrderId,
        product: ProductId,
        quantity: u32,
    ) -> StoreResult<OrderDetail> {
        if quantity == 0 {
            return Err(CheckoutError::InvalidLineItem(format!(
                "quantity for {product} must be positive"
            ))
            .into());
        }
        let mut tx = self.pool.begin().await.map_err(StoreError::from_sqlx)?;

        let order_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM orders WHERE id_key = $1)")
                .bind(order.as_i64())
                .fetch_one(&mut *tx)
                .await
                .map_err(StoreError::from_sqlx)?;
        if !order_exists {
            return Err(StoreError::RowNotFound {
                entity: "order",
                key: order.as_i64(),
            });
        }

        let price: Decimal =
            sqlx::query_scalar("SELECT price FROM products WHERE id_key = $1")
                .bind(product.as_i64())
                .fetch_optional(&mut *tx)
                .await
                .map_err(StoreError::from_sqlx)?
                .ok_or(CheckoutError::ProductNotFound(product))?;

        reserve(&mut tx, product, quantity).await?;

        let row = sqlx::query_as::<_, OrderDetailRow>(
            "INSERT INTO order_details (order_id, product_id, quantity, price)
             VALUES ($1, $2, $3, $4)
             RETURNING id_key, order_id, product_id, quantity, price",
        )
        .bind(order.as_i64())
        .bind(product.as_i64())
        .bind(quantity as i32)
        .bind(Money::from_decimal(price).amount())
        .fetch_one(&mut *tx)
        .await
        .map_err(StoreError::from_sqlx)?;

        recompute_total(&mut tx, order).await?;
        tx.commit().await.map_err(StoreError::from_sqlx)?;
        Ok(row.into_detail())
    }

    /// Change a line item's quantity, reconciling stock by the delta.
    pub async fn update_quantity(
        &self,
        id: OrderDetailId,
        quantity: u32,
    ) -> StoreResult<OrderDetail> {
        if quantity == 0 {
            return Err(
                CheckoutError::InvalidLineItem("quantity must be positive".to_string()).into(),
            );
        }
        let mut tx = self.pool.begin().await.map_err(StoreError::from_sqlx)?;

        let current = lock_detail(&mut tx, id).await?;
        let old = current.quantity;

        if quantity > old {
            reserve(&mut tx, current.product_id, quantity - old).await?;
        } else if quantity < old {
            release(&mut tx, current.product_id, old - quantity).await?;
        }

        let row = sqlx::query_as::<_, OrderDetailRow>(
            "UPDATE order_details SET quantity = $2 WHERE id_key = $1
             RETURNING id_key, order_id, product_id, quantity, price",
        )
        .bind(id.as_i64())
        .bind(quantity as i32)
        .fetch_one(&mut *tx)
        .await
        .map_err(StoreError::from_sqlx)?;

        recompute_total(&mut tx, current.order_id).await?;
        tx.commit().await.map_err(StoreError::from_sqlx)?;
        Ok(row.into_detail())
    }

    /// Remove a line item, releasing its full reserved quantity.
    pub async fn delete(&self, id: OrderDetailId) -> StoreResult<()> {
        let mut tx = self.pool.begin().await.map_err(StoreError::from_sqlx)?;

        let current = lock_detail(&mut tx, id).await?;
        release(&mut tx, current.product_id, current.quantity).await?;

        sqlx::query("DELETE FROM order_details WHERE id_key = $1")
            .bind(id.as_i64())
            .execute(&mut *tx)
            .await
            .map_err(StoreError::from_sqlx)?;

        recompute_total(&mut tx, current.order_id).await?;
        tx.commit().await.map_err(StoreError::from_sqlx)?;
        Ok(())
    }
}

/// Lock and load a detail row for read-modify-write.
async fn lock_detail(
    tx: &mut Transaction<'_, Postgres>,
    id: OrderDetailId,
) -> StoreResult<OrderDetail> {
    let row = sqlx::query_as::<_, OrderDetailRow>(
        "SELECT id_key, order_id, product_id, quantity, price
         FROM order_details WHERE id_key = $1 FOR UPDATE",
    )
    .bind(id.as_i64())
    .fetch_optional(&mut **tx)
    .await
    .map_err(StoreError::from_sqlx)?
    .ok_or(StoreError::RowNotFound {
        entity: "order detail",
        key: id.as_i64(),
    })?;
    Ok(row.into_detail())
}

/// Conditionally decrement stock; a miss reports the live quantity.
async fn reserve(
    tx: &mut Transaction<'_, Postgres>,
    product: ProductId,
    quantity: u32,
) -> StoreResult<()> {
    let result = sqlx::query(
        "UPDATE products SET stock = stock - $2, updated_at = now()
         WHERE id_key = $1 AND stock >= $2",
    )
    .bind(product.as_i64())
    .bind(quantity as i32)
    .execute(&mut **tx)
    .await
    .map_err(StoreError::from_sqlx)?;

    if result.rows_affected() == 1 {
        return Ok(());
    }
    let available: Option<i32> = sqlx::query_scalar("SELECT stock FROM products WHERE id_key = $1")
        .bind(product.as_i64())
        .fetch_optional(&mut **tx)
        .await
        .map_err(StoreError::from_sqlx)?;
    Err(match available {
        Some(stock) => CheckoutError::InsufficientStock {
            product_id: product,
            available: count_from_db(stock),
            requested: quantity,
        }
        .into(),
        None => CheckoutError::ProductNotFound(product).into(),
    })
}

/// Return released units to stock.
async fn release(
    tx: &mut Transaction<'_, Postgres>,
    product: ProductId,
    quantity: u32,
) -> StoreResult<()> {
    sqlx::query("UPDATE products SET stock = stock + $2, updated_at = now() WHERE id_key = $1")
        .bind(product.as_i64())
        .bind(quantity as i32)
        .execute(&mut **tx)
        .await
        .map_err(StoreError::from_sqlx)?;
    Ok(())
}

/// Keep the order total reconciled with its line items.
async fn recompute_total(tx: &mut Transaction<'_, Postgres>, order: OrderId) -> StoreResult<()> {
    sqlx::query(
        "UPDATE orders
         SET total = (SELECT COALESCE(SUM(quantity * price), 0)
                      FROM order_details WHERE order_id = $1)
         WHERE id_key = $1",
    )
    .bind(order.as_i64())
    .execute(&mut **tx)
    .await
    .map_err(StoreError::from_sqlx)?;
    Ok(())
}
