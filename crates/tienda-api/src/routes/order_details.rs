//! # Line-Item Routes
//!
//! Direct mutation of order line items. Every write reconciles product
//! stock and the owning order's total in the store's transaction.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use utoipa::ToSchema;

use tienda_core::{OrderDetailId, OrderId, ProductId};

use crate::error::AppError;
use crate::extractors::Pagination;
use crate::routes::orders::OrderDetailResponse;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(get_one).put(update).delete(delete))
}

/// Creation request. The unit price is captured from the catalog, never
/// taken from the caller.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateOrderDetailRequest {
    /// Owning order.
    pub order_id: i64,
    /// Product to reserve.
    pub product_id: i64,
    /// Units to reserve, positive.
    pub quantity: u32,
}

/// Quantity change request.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateOrderDetailRequest {
    /// New quantity, positive.
    pub quantity: u32,
}

#[utoipa::path(
    get,
    path = "/api/v1/order-details",
    params(Pagination),
    responses((status = 200, body = [OrderDetailResponse])),
    tag = "order-details",
)]
pub(crate) async fn list(
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<OrderDetailResponse>>, AppError> {
    let (skip, limit) = page.bounds();
    let details = state.order_details.list(skip, limit).await?;
    Ok(Json(details.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/api/v1/order-details/{id}",
    responses(
        (status = 200, body = OrderDetailResponse),
        (status = 404, description = "Unknown line item"),
    ),
    tag = "order-details",
)]
pub(crate) async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<OrderDetailResponse>, AppError> {
    let detail = state.order_details.get(OrderDetailId::new(id)).await?;
    Ok(Json(detail.into()))
}

#[utoipa::path(
    post,
    path = "/api/v1/order-details",
    request_body = CreateOrderDetailRequest,
    responses(
        (status = 201, body = OrderDetailResponse),
        (status = 400, description = "Insufficient stock or invalid quantity"),
        (status = 404, description = "Unknown order or product"),
    ),
    tag = "order-details",
)]
pub(crate) async fn create(
    State(state): State<AppState>,
    Json(request): Json<CreateOrderDetailRequest>,
) -> Result<(StatusCode, Json<OrderDetailResponse>), AppError> {
    let detail = state
        .order_details
        .create(
            OrderId::new(request.order_id),
            ProductId::new(request.product_id),
            request.quantity,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(detail.into())))
}

#[utoipa::path(
    put,
    path = "/api/v1/order-details/{id}",
    request_body = UpdateOrderDetailRequest,
    responses(
        (status = 200, body = OrderDetailResponse),
        (status = 400, description = "Insufficient stock for the increase"),
        (status = 404, description = "Unknown line item"),
    ),
    tag = "order-details",
)]
pub(crate) async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateOrderDetailRequest>,
) -> Result<Json<OrderDetailResponse>, AppError> {
    let detail = state
        .order_details
        .update_quantity(OrderDetailId::new(id), request.quantity)
        .await?;
    Ok(Json(detail.into()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/order-details/{id}",
    responses(
        (status = 204, description = "Deleted; reserved stock released"),
        (status = 404, description = "Unknown line item"),
    ),
    tag = "order-details",
)]
pub(crate) async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.order_details.delete(OrderDetailId::new(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
