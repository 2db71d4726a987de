//! # Order Store
//!
//! Reads and lifecycle mutations for persisted orders. Placement itself
//! lives in [`crate::checkout`]; this store covers lookup, status
//! transitions, and deletion. Deleting an order releases every unit its
//! line items had reserved, inside the same transaction, so reservations
//! never leak.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use tienda_core::{BillId, ClientId, Money, OrderDetailId, OrderId, ProductId};
use tienda_domain::{DeliveryMethod, Order, OrderDetail, OrderNumber, OrderStatus};

use crate::count_from_db;
use crate::error::{StoreError, StoreResult};

pub(crate) const ORDER_COLUMNS: &str =
    "id_key, order_number, date, total, delivery_method, status, client_id, bill_id";

#[derive(sqlx::FromRow)]
pub(crate) struct OrderRow {
    id_key: i64,
    order_number: String,
    date: DateTime<Utc>,
    total: Decimal,
    delivery_method: i16,
    status: i16,
    client_id: i64,
    bill_id: Option<i64>,
}

impl OrderRow {
    pub(crate) fn into_order(self) -> StoreResult<Order> {
        Ok(Order {
            id: OrderId::new(self.id_key),
            order_number: OrderNumber::from_stored(self.order_number),
            date: self.date,
            total: Money::from_decimal(self.total),
            delivery_method: DeliveryMethod::from_code(self.delivery_method)?,
            status: OrderStatus::from_code(self.status)?,
            client_id: ClientId::new(self.client_id),
            bill_id: self.bill_id.map(BillId::new),
        })
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct OrderDetailRow {
    id_key: i64,
    order_id: i64,
    product_id: i64,
    quantity: i32,
    price: Decimal,
}

impl OrderDetailRow {
    pub(crate) fn into_detail(self) -> OrderDetail {
        OrderDetail {
            id: OrderDetailId::new(self.id_key),
            order_id: OrderId::new(self.order_id),
            product_id: ProductId::new(self.product_id),
            quantity: count_from_db(self.quantity),
            price: Money::from_decimal(self.price),
        }
    }
}

/// Store for order headers and their line items.
#[derive(Clone)]
pub struct OrderStore {
    pool: PgPool,
}

impl OrderStore {
    /// Wrap a pool.
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetch an order header by key.
    pub async fn get(&self, id: OrderId) -> StoreResult<Order> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id_key = $1"
        ))
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)?
        .ok_or(StoreError::RowNotFound {
            entity: "order",
            key: id.as_i64(),
        })?;
        row.into_order()
    }

    /// Fetch an order header together with its line items.
    pub async fn get_with_details(&self, id: OrderId) -> StoreResult<(Order, Vec<OrderDetail>)> {
        let order = self.get(id).await?;
        let details = self.details(id).await?;
        Ok((order, details))
    }

    /// The line items of an order, in insertion order.
    pub async fn details(&self, id: OrderId) -> StoreResult<Vec<OrderDetail>> {
        let rows = sqlx::query_as::<_, OrderDetailRow>(
            "SELECT id_key, order_id, product_id, quantity, price
             FROM order_details WHERE order_id = $1 ORDER BY id_key",
        )
        .bind(id.as_i64())
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)?;
        Ok(rows.into_iter().map(OrderDetailRow::into_detail).collect())
    }

    /// List orders, newest first, optionally for one client.
    pub async fn list(
        &self,
        client: Option<ClientId>,
        skip: i64,
        limit: i64,
    ) -> StoreResult<Vec<Order>> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders
             WHERE ($1::BIGINT IS NULL OR client_id = $1)
             ORDER BY date DESC, id_key DESC OFFSET $2 LIMIT $3"
        ))
        .bind(client.map(|c| c.as_i64()))
        .bind(skip)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)?;
        rows.into_iter().map(OrderRow::into_order).collect()
    }

    /// Move an order to a new status, validating the transition against
    /// the row's current status under a row lock.
    pub async fn update_status(&self, id: OrderId, next: OrderStatus) -> StoreResult<Order> {
        let mut tx = self.pool.begin().await.map_err(StoreError::from_sqlx)?;

        let current: i16 =
            sqlx::query_scalar("SELECT status FROM orders WHERE id_key = $1 FOR UPDATE")
                .bind(id.as_i64())
                .fetch_optional(&mut *tx)
                .await
                .map_err(StoreError::from_sqlx)?
                .ok_or(StoreError::RowNotFound {
                    entity: "order",
                    key: id.as_i64(),
                })?;

        let status = OrderStatus::from_code(current)?.transition(next)?;

        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "UPDATE orders SET status = $2 WHERE id_key = $1 RETURNING {ORDER_COLUMNS}"
        ))
        .bind(id.as_i64())
        .bind(status.code())
        .fetch_one(&mut *tx)
        .await
        .map_err(StoreError::from_sqlx)?;

        tx.commit().await.map_err(StoreError::from_sqlx)?;
        row.into_order()
    }

    /// Delete an order, restoring the reserved stock of all its line
    /// items in the same transaction.
    ///
    /// # Errors
    ///
    /// `ForeignKey` when a bill already references the order; billed
    /// orders are financial history and stay.
    pub async fn delete(&self, id: OrderId) -> StoreResult<()> {
        let mut tx = self.pool.begin().await.map_err(StoreError::from_sqlx)?;

        // Aggregate per product before updating: UPDATE .. FROM applies at
        // most one join row per target row, so duplicate-product details
        // must be summed first.
        sqlx::query(
            "UPDATE products p
             SET stock = p.stock + d.qty, updated_at = now()
             FROM (SELECT product_id, SUM(quantity) AS qty
                   FROM order_details WHERE order_id = $1
                   GROUP BY product_id) d
             WHERE p.id_key = d.product_id",
        )
        .bind(id.as_i64())
        .execute(&mut *tx)
        .await
        .map_err(StoreError::from_sqlx)?;

        let result = sqlx::query("DELETE FROM orders WHERE id_key = $1")
            .bind(id.as_i64())
            .execute(&mut *tx)
            .await
            .map_err(StoreError::from_sqlx)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::RowNotFound {
                entity: "order",
                key: id.as_i64(),
            });
        }

        tx.commit().await.map_err(StoreError::from_sqlx)?;
        Ok(())
    }
}
