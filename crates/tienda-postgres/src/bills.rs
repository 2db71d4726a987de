//! # Bill Store
//!
//! Read access to persisted bills. Creation goes through billing
//! derivation in [`crate::checkout`]; there is no other write path, which
//! is how the one-bill-per-order invariant stays in one place.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use tienda_core::{BillId, ClientId, Money, OrderId};
use tienda_domain::{Bill, BillNumber, PaymentType};

use crate::error::{StoreError, StoreResult};

const BILL_COLUMNS: &str =
    "id_key, bill_number, order_id, client_id, subtotal, taxes, discount, total, payment_type, date";

#[derive(sqlx::FromRow)]
struct BillRow {
    id_key: i64,
    bill_number: String,
    order_id: i64,
    client_id: i64,
    subtotal: Decimal,
    taxes: Decimal,
    discount: Decimal,
    total: Decimal,
    payment_type: i16,
    date: DateTime<Utc>,
}

impl BillRow {
    fn into_bill(self) -> StoreResult<Bill> {
        Ok(Bill {
            id: BillId::new(self.id_key),
            bill_number: BillNumber::from_stored(self.bill_number),
            order_id: OrderId::new(self.order_id),
            client_id: ClientId::new(self.client_id),
            subtotal: Money::from_decimal(self.subtotal),
            taxes: Money::from_decimal(self.taxes),
            discount: Money::from_decimal(self.discount),
            total: Money::from_decimal(self.total),
            payment_type: PaymentType::from_code(self.payment_type)?,
            date: self.date,
        })
    }
}

/// Store for bills.
#[derive(Clone)]
pub struct BillStore {
    pool: PgPool,
}

impl BillStore {
    /// Wrap a pool.
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetch a bill by key.
    pub async fn get(&self, id: BillId) -> StoreResult<Bill> {
        let row = sqlx::query_as::<_, BillRow>(&format!(
            "SELECT {BILL_COLUMNS} FROM bills WHERE id_key = $1"
        ))
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)?
        .ok_or(StoreError::RowNotFound {
            entity: "bill",
            key: id.as_i64(),
        })?;
        row.into_bill()
    }

    /// Fetch the bill of an order, if one was derived.
    pub async fn get_by_order(&self, order: OrderId) -> StoreResult<Option<Bill>> {
        let row = sqlx::query_as::<_, BillRow>(&format!(
            "SELECT {BILL_COLUMNS} FROM bills WHERE order_id = $1"
        ))
        .bind(order.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)?;
        row.map(BillRow::into_bill).transpose()
    }

    /// List bills, newest first.
    pub async fn list(&self, skip: i64, limit: i64) -> StoreResult<Vec<Bill>> {
        let rows = sqlx::query_as::<_, BillRow>(&format!(
            "SELECT {BILL_COLUMNS} FROM bills ORDER BY date DESC, id_key DESC OFFSET $1 LIMIT $2"
        ))
        .bind(skip)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)?;
        rows.into_iter().map(BillRow::into_bill).collect()
    }

    /// List a client's bills, newest first.
    pub async fn list_by_client(&self, client: ClientId) -> StoreResult<Vec<Bill>> {
        let rows = sqlx::query_as::<_, BillRow>(&format!(
            "SELECT {BILL_COLUMNS} FROM bills WHERE client_id = $1 ORDER BY date DESC, id_key DESC"
        ))
        .bind(client.as_i64())
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)?;
        rows.into_iter().map(BillRow::into_bill).collect()
    }
}
