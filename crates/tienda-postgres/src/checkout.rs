//! # Order Placement Workflow
//!
//! The one multi-entity transactional path in the backend. Placement runs
//! in three phases:
//!
//! 1. **Plan** (pure, `tienda-domain`): load the client and a catalog
//!    snapshot, validate every precondition, capture unit prices, and
//!    recompute the total. Any failure here has zero side effects.
//! 2. **Execute** (one transaction): conditionally decrement stock per
//!    product (`… AND stock >= $q`, verified by row count), insert the
//!    order header and its line items, commit. A decrement miss means a
//!    concurrent placement won the stock; the transaction rolls back and
//!    the caller gets `InsufficientStock` against the live quantity.
//!    An order-number collision retries the whole transaction with a
//!    regenerated number, bounded.
//! 3. **Bill** (second transaction): derive and persist the bill, link it
//!    onto the order. Failure here does NOT roll back the order; the
//!    placement reports degraded success with the failure message.
//!
//! Serialization of concurrent placements against the same product comes
//! entirely from phase 2's conditional update. There is no in-process
//! locking; multiple server processes are safe.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use tienda_core::{BillId, ClientId, Money, OrderId};
use tienda_domain::{
    Bill, BillDraft, CheckoutError, Client, Order, OrderNumber, OrderPlan, OrderStatus,
    PaymentType, PlacementRequest, Product, TaxRate,
};

use crate::clients::{ClientRow, CLIENT_COLUMNS};
use crate::count_from_db;
use crate::error::{StoreError, StoreResult};
use crate::orders::OrderRow;
use crate::products::{ProductRow, PRODUCT_COLUMNS};

/// Bounded retries for randomized document numbers.
const NUMBERING_ATTEMPTS: usize = 3;
/// Unique index on `orders.order_number`.
const ORDER_NUMBER_CONSTRAINT: &str = "orders_order_number_key";
/// Unique index on `bills.bill_number`.
const BILL_NUMBER_CONSTRAINT: &str = "bills_bill_number_key";
/// Unique index on `bills.order_id`: one bill per order.
const BILL_ORDER_CONSTRAINT: &str = "bills_order_id_key";

/// Outcome of a successful (possibly degraded) placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementReceipt {
    /// The persisted order.
    pub order_id: OrderId,
    /// Its generated number.
    pub order_number: OrderNumber,
    /// The recomputed order total.
    pub total: Money,
    /// The linked bill, absent when billing derivation failed.
    pub bill_id: Option<BillId>,
    /// Why the bill is absent, when it is.
    pub bill_error: Option<String>,
}

/// Executes order placement and billing derivation.
#[derive(Clone)]
pub struct CheckoutStore {
    pool: PgPool,
    tax_rate: TaxRate,
}

impl CheckoutStore {
    /// Wrap a pool with the configured tax rate.
    pub const fn new(pool: PgPool, tax_rate: TaxRate) -> Self {
        Self { pool, tax_rate }
    }

    /// Place an order.
    ///
    /// # Errors
    ///
    /// Precondition failures (`ClientNotFound`, `ProductNotFound`,
    /// `InvalidLineItem`, `InsufficientStock`) abort with zero side
    /// effects. Billing failure after the order commit is NOT an error:
    /// it is reported inside the receipt.
    pub async fn place_order(
        &self,
        request: &PlacementRequest,
        payment_type: PaymentType,
    ) -> StoreResult<PlacementReceipt> {
        let client = self.load_client(request.client_id).await?;
        let catalog = self.load_catalog(request).await?;
        let plan = OrderPlan::build(&client, request, &catalog)?;

        let order = self.execute_plan(&plan).await?;
        metrics::counter!("tienda_orders_placed_total").increment(1);
        tracing::info!(
            order = %order.order_number,
            client = %order.client_id,
            total = %order.total,
            "order placed"
        );

        match self.derive_bill(&order, payment_type).await {
            Ok(bill) => Ok(PlacementReceipt {
                order_id: order.id,
                order_number: order.order_number,
                total: order.total,
                bill_id: Some(bill.id),
                bill_error: None,
            }),
            Err(err) => {
                // Degraded success: the order stands without a bill.
                metrics::counter!("tienda_billing_failures_total").increment(1);
                tracing::warn!(
                    order = %order.id,
                    error = %err,
                    "billing derivation failed, order committed without a bill"
                );
                Ok(PlacementReceipt {
                    order_id: order.id,
                    order_number: order.order_number,
                    total: order.total,
                    bill_id: None,
                    bill_error: Some(err.to_string()),
                })
            }
        }
    }

    /// Derive and persist the bill for an order, linking it back.
    ///
    /// # Errors
    ///
    /// `BillAlreadyExists` when the order is already billed, including
    /// the case where a concurrent derivation won the unique constraint.
    pub async fn derive_bill(&self, order: &Order, payment_type: PaymentType) -> StoreResult<Bill> {
        if order.bill_id.is_some() {
            return Err(CheckoutError::BillAlreadyExists(order.id).into());
        }
        for _ in 0..NUMBERING_ATTEMPTS {
            let draft = BillDraft::derive(
                order,
                self.tax_rate,
                Money::zero(),
                payment_type,
                Utc::now(),
            );
            match self.try_persist_bill(&draft).await {
                Err(err) if err.is_conflict_on(BILL_NUMBER_CONSTRAINT) => continue,
                Err(err) if err.is_conflict_on(BILL_ORDER_CONSTRAINT) => {
                    return Err(CheckoutError::BillAlreadyExists(order.id).into())
                }
                other => return other,
            }
        }
        Err(StoreError::NumberingExhausted("bill"))
    }

    async fn load_client(&self, id: ClientId) -> StoreResult<Client> {
        let row = sqlx::query_as::<_, ClientRow>(&format!(
            "SELECT {CLIENT_COLUMNS} FROM clients WHERE id_key = $1"
        ))
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)?
        .ok_or(CheckoutError::ClientNotFound(id))?;
        Ok(row.into_client())
    }

    /// Snapshot of every product the request references. Missing products
    /// are reported by the planner, which sees what is absent here.
    async fn load_catalog(&self, request: &PlacementRequest) -> StoreResult<Vec<Product>> {
        let ids: Vec<i64> = request
            .items
            .iter()
            .map(|i| i.product_id.as_i64())
            .collect();
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id_key = ANY($1)"
        ))
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)?;
        Ok(rows.into_iter().map(ProductRow::into_product).collect())
    }

    async fn execute_plan(&self, plan: &OrderPlan) -> StoreResult<Order> {
        for _ in 0..NUMBERING_ATTEMPTS {
            let number = OrderNumber::generate(Utc::now());
            match self.try_execute_plan(plan, &number).await {
                Err(err) if err.is_conflict_on(ORDER_NUMBER_CONSTRAINT) => {
                    tracing::debug!(%number, "order number collision, regenerating");
                    continue;
                }
                other => return other,
            }
        }
        Err(StoreError::NumberingExhausted("order"))
    }

    async fn try_execute_plan(&self, plan: &OrderPlan, number: &OrderNumber) -> StoreResult<Order> {
        let mut tx = self.pool.begin().await.map_err(StoreError::from_sqlx)?;

        // Reserve stock first. The WHERE clause is the oversell guard: a
        // concurrent placement that got there first leaves this update
        // matching zero rows.
        for (product_id, quantity) in plan.demand() {
            let result = sqlx::query(
                "UPDATE products SET stock = stock - $2, updated_at = now()
                 WHERE id_key = $1 AND stock >= $2",
            )
            .bind(product_id.as_i64())
            .bind(quantity as i32)
            .execute(&mut *tx)
            .await
            .map_err(StoreError::from_sqlx)?;

            if result.rows_affected() != 1 {
                let available: Option<i32> =
                    sqlx::query_scalar("SELECT stock FROM products WHERE id_key = $1")
                        .bind(product_id.as_i64())
                        .fetch_optional(&mut *tx)
                        .await
                        .map_err(StoreError::from_sqlx)?;
                tx.rollback().await.map_err(StoreError::from_sqlx)?;
                return Err(match available {
                    Some(stock) => CheckoutError::InsufficientStock {
                        product_id,
                        available: count_from_db(stock),
                        requested: quantity,
                    }
                    .into(),
                    None => CheckoutError::ProductNotFound(product_id).into(),
                });
            }
        }

        let row = sqlx::query_as::<_, OrderRow>(
            "INSERT INTO orders (order_number, total, delivery_method, status, client_id)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id_key, order_number, date, total, delivery_method, status, client_id, bill_id",
        )
        .bind(number.as_str())
        .bind(plan.total.amount())
        .bind(plan.delivery_method.code())
        .bind(OrderStatus::Pending.code())
        .bind(plan.client_id.as_i64())
        .fetch_one(&mut *tx)
        .await
        .map_err(StoreError::from_sqlx)?;
        let order = row.into_order()?;

        for line in &plan.lines {
            sqlx::query(
                "INSERT INTO order_details (order_id, product_id, quantity, price)
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(order.id.as_i64())
            .bind(line.product_id.as_i64())
            .bind(line.quantity as i32)
            .bind(line.unit_price.amount())
            .execute(&mut *tx)
            .await
            .map_err(StoreError::from_sqlx)?;
        }

        tx.commit().await.map_err(StoreError::from_sqlx)?;
        Ok(order)
    }

    async fn try_persist_bill(&self, draft: &BillDraft) -> StoreResult<Bill> {
        let mut tx = self.pool.begin().await.map_err(StoreError::from_sqlx)?;

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO bills
                 (bill_number, order_id, client_id, subtotal, taxes, discount, total, payment_type, date)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING id_key",
        )
        .bind(draft.bill_number.as_str())
        .bind(draft.order_id.as_i64())
        .bind(draft.client_id.as_i64())
        .bind(draft.subtotal.amount())
        .bind(draft.taxes.amount())
        .bind(draft.discount.amount())
        .bind(draft.total.amount())
        .bind(draft.payment_type.code())
        .bind(draft.date)
        .fetch_one(&mut *tx)
        .await
        .map_err(StoreError::from_sqlx)?;

        sqlx::query("UPDATE orders SET bill_id = $1 WHERE id_key = $2")
            .bind(id)
            .bind(draft.order_id.as_i64())
            .execute(&mut *tx)
            .await
            .map_err(StoreError::from_sqlx)?;

        tx.commit().await.map_err(StoreError::from_sqlx)?;
        Ok(Bill {
            id: BillId::new(id),
            bill_number: draft.bill_number.clone(),
            order_id: draft.order_id,
            client_id: draft.client_id,
            subtotal: draft.subtotal,
            taxes: draft.taxes,
            discount: draft.discount,
            total: draft.total,
            payment_type: draft.payment_type,
            date: draft.date,
        })
    }
}
