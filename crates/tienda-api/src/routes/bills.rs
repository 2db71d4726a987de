//! # Bill Routes
//!
//! Read-only. Bills come into existence through billing derivation at
//! order placement; the API never creates or mutates one directly.

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use tienda_core::{BillId, ClientId, OrderId};
use tienda_domain::Bill;

use crate::error::AppError;
use crate::extractors::Pagination;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/{id}", get(get_one))
        .route("/by-order/{order_id}", get(get_by_order))
        .route("/by-client/{client_id}", get(list_by_client))
}

/// Bill representation on the wire.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BillResponse {
    /// Database key.
    pub id: i64,
    /// Unique bill number.
    pub bill_number: String,
    /// Billed order.
    pub order_id: i64,
    /// Billed client.
    pub client_id: i64,
    /// Order total at billing time.
    pub subtotal: f64,
    /// Taxes on the subtotal.
    pub taxes: f64,
    /// Discount applied.
    pub discount: f64,
    /// Final amount due.
    pub total: f64,
    /// Payment type code.
    pub payment_type: i16,
    /// Billing instant.
    pub date: DateTime<Utc>,
}

impl From<Bill> for BillResponse {
    fn from(bill: Bill) -> Self {
        Self {
            id: bill.id.as_i64(),
            bill_number: bill.bill_number.to_string(),
            order_id: bill.order_id.as_i64(),
            client_id: bill.client_id.as_i64(),
            subtotal: bill.subtotal.to_f64(),
            taxes: bill.taxes.to_f64(),
            discount: bill.discount.to_f64(),
            total: bill.total.to_f64(),
            payment_type: bill.payment_type.code(),
            date: bill.date,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/bills",
    params(Pagination),
    responses((status = 200, body = [BillResponse])),
    tag = "bills",
)]
pub(crate) async fn list(
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<BillResponse>>, AppError> {
    let (skip, limit) = page.bounds();
    let bills = state.bills.list(skip, limit).await?;
    Ok(Json(bills.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/api/v1/bills/{id}",
    responses(
        (status = 200, body = BillResponse),
        (status = 404, description = "Unknown bill"),
    ),
    tag = "bills",
)]
pub(crate) async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<BillResponse>, AppError> {
    let bill = state.bills.get(BillId::new(id)).await?;
    Ok(Json(bill.into()))
}

#[utoipa::path(
    get,
    path = "/api/v1/bills/by-order/{order_id}",
    responses(
        (status = 200, body = BillResponse),
        (status = 404, description = "Order has no bill"),
    ),
    tag = "bills",
)]
pub(crate) async fn get_by_order(
    State(state): State<AppState>,
    Path(order_id): Path<i64>,
) -> Result<Json<BillResponse>, AppError> {
    let bill = state
        .bills
        .get_by_order(OrderId::new(order_id))
        .await?
        .ok_or(AppError::NotFound {
            error_kind: "not_found",
            message: format!("order {order_id} has no bill"),
        })?;
    Ok(Json(bill.into()))
}

#[utoipa::path(
    get,
    path = "/api/v1/bills/by-client/{client_id}",
    responses((status = 200, body = [BillResponse])),
    tag = "bills",
)]
pub(crate) async fn list_by_client(
    State(state): State<AppState>,
    Path(client_id): Path<i64>,
) -> Result<Json<Vec<BillResponse>>, AppError> {
    let bills = state.bills.list_by_client(ClientId::new(client_id)).await?;
    Ok(Json(bills.into_iter().map(Into::into).collect()))
}
