//! # Order Routes
//!
//! Placement (`POST /orders`), lookup with line items, validated status
//! transitions, and deletion. The placement payload accepts a client
//! `price` per line for wire compatibility, but pricing and the total
//! are always recomputed server-side.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use tienda_core::{ClientId, Money, OrderId, ProductId};
use tienda_domain::{
    DeliveryMethod, LineItemRequest, Order, OrderDetail, OrderStatus, PaymentType,
    PlacementRequest,
};
use tienda_postgres::PlacementReceipt;

use crate::error::AppError;
use crate::extractors::Pagination;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(place))
        .route("/{id}", get(get_one).delete(delete))
        .route("/{id}/status", put(update_status))
}

/// Owner filter for listing.
#[derive(Debug, Clone, Copy, Deserialize, IntoParams)]
pub struct ClientFilter {
    /// Only orders of this client.
    pub client_id: Option<i64>,
}

/// One requested line of a placement.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct OrderDetailRequest {
    /// Requested product.
    pub product_id: i64,
    /// Requested units, positive.
    pub quantity: u32,
    /// Client-side price echo; ignored in favor of the catalog price.
    pub price: Option<f64>,
}

/// Placement request body.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PlaceOrderRequest {
    /// Ordering client.
    pub client_id: i64,
    /// Delivery method code: 1 standard, 2 pickup, 3 express.
    pub delivery_method: i16,
    /// Payment type code for the derived bill: 1 cash (default),
    /// 2 credit card, 3 debit card, 4 transfer.
    pub payment_type: Option<i16>,
    /// Requested lines, non-empty.
    pub order_details: Vec<OrderDetailRequest>,
}

impl PlaceOrderRequest {
    fn into_domain(self) -> Result<(PlacementRequest, PaymentType), AppError> {
        let delivery_method = DeliveryMethod::from_code(self.delivery_method)?;
        let payment_type = match self.payment_type {
            Some(code) => PaymentType::from_code(code)?,
            None => PaymentType::Cash,
        };
        let mut items = Vec::with_capacity(self.order_details.len());
        for line in self.order_details {
            items.push(LineItemRequest {
                product_id: ProductId::new(line.product_id),
                quantity: line.quantity,
                declared_price: line.price.map(Money::from_f64).transpose()?,
            });
        }
        Ok((
            PlacementRequest {
                client_id: ClientId::new(self.client_id),
                delivery_method,
                items,
            },
            payment_type,
        ))
    }
}

/// Placement response body.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PlaceOrderResponse {
    /// Always true on a 201; the bill may still be absent.
    pub success: bool,
    /// The persisted order.
    pub order_id: i64,
    /// Its generated number.
    pub order_number: String,
    /// The recomputed total.
    pub total: f64,
    /// The linked bill, null when billing derivation failed.
    pub bill_id: Option<i64>,
    /// Why the bill is absent, when it is.
    pub bill_error: Option<String>,
}

impl From<PlacementReceipt> for PlaceOrderResponse {
    fn from(receipt: PlacementReceipt) -> Self {
        Self {
            success: true,
            order_id: receipt.order_id.as_i64(),
            order_number: receipt.order_number.to_string(),
            total: receipt.total.to_f64(),
            bill_id: receipt.bill_id.map(|b| b.as_i64()),
            bill_error: receipt.bill_error,
        }
    }
}

/// Status transition request.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    /// Target status code: 1 pending, 2 processing, 3 completed,
    /// 4 cancelled.
    pub status: i16,
}

/// Order header on the wire.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrderResponse {
    /// Database key.
    pub id: i64,
    /// Generated order number.
    pub order_number: String,
    /// Placement instant.
    pub date: DateTime<Utc>,
    /// Order total.
    pub total: f64,
    /// Delivery method code.
    pub delivery_method: i16,
    /// Status name.
    pub status: String,
    /// Ordering client.
    pub client_id: i64,
    /// Linked bill.
    pub bill_id: Option<i64>,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id.as_i64(),
            order_number: order.order_number.to_string(),
            date: order.date,
            total: order.total.to_f64(),
            delivery_method: order.delivery_method.code(),
            status: order.status.to_string(),
            client_id: order.client_id.as_i64(),
            bill_id: order.bill_id.map(|b| b.as_i64()),
        }
    }
}

/// One persisted line item on the wire.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrderDetailResponse {
    /// Database key.
    pub id: i64,
    /// Owning order.
    pub order_id: i64,
    /// Ordered product.
    pub product_id: i64,
    /// Units ordered.
    pub quantity: u32,
    /// Unit price captured at order time.
    pub price: f64,
}

impl From<OrderDetail> for OrderDetailResponse {
    fn from(detail: OrderDetail) -> Self {
        Self {
            id: detail.id.as_i64(),
            order_id: detail.order_id.as_i64(),
            product_id: detail.product_id.as_i64(),
            quantity: detail.quantity,
            price: detail.price.to_f64(),
        }
    }
}

/// Order header plus line items.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrderWithDetailsResponse {
    /// The order header.
    #[serde(flatten)]
    pub order: OrderResponse,
    /// Its line items.
    pub order_details: Vec<OrderDetailResponse>,
}

#[utoipa::path(
    post,
    path = "/api/v1/orders",
    request_body = PlaceOrderRequest,
    responses(
        (status = 201, description = "Order placed; bill_id may be null on degraded success", body = PlaceOrderResponse),
        (status = 400, description = "Invalid line item or insufficient stock"),
        (status = 404, description = "Unknown client or product"),
    ),
    tag = "orders",
)]
pub(crate) async fn place(
    State(state): State<AppState>,
    Json(request): Json<PlaceOrderRequest>,
) -> Result<(StatusCode, Json<PlaceOrderResponse>), AppError> {
    let (placement, payment_type) = request.into_domain()?;
    let receipt = state.checkout.place_order(&placement, payment_type).await?;
    Ok((StatusCode::CREATED, Json(receipt.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/orders",
    params(Pagination, ClientFilter),
    responses((status = 200, body = [OrderResponse])),
    tag = "orders",
)]
pub(crate) async fn list(
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
    Query(filter): Query<ClientFilter>,
) -> Result<Json<Vec<OrderResponse>>, AppError> {
    let (skip, limit) = page.bounds();
    let orders = state
        .orders
        .list(filter.client_id.map(ClientId::new), skip, limit)
        .await?;
    Ok(Json(orders.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}",
    responses(
        (status = 200, body = OrderWithDetailsResponse),
        (status = 404, description = "Unknown order"),
    ),
    tag = "orders",
)]
pub(crate) async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<OrderWithDetailsResponse>, AppError> {
    let (order, details) = state.orders.get_with_details(OrderId::new(id)).await?;
    Ok(Json(OrderWithDetailsResponse {
        order: order.into(),
        order_details: details.into_iter().map(Into::into).collect(),
    }))
}

#[utoipa::path(
    put,
    path = "/api/v1/orders/{id}/status",
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, body = OrderResponse),
        (status = 404, description = "Unknown order"),
        (status = 409, description = "Transition not allowed"),
    ),
    tag = "orders",
)]
pub(crate) async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateOrderStatusRequest>,
) -> Result<Json<OrderResponse>, AppError> {
    let next = OrderStatus::from_code(request.status)?;
    let order = state.orders.update_status(OrderId::new(id), next).await?;
    Ok(Json(order.into()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/orders/{id}",
    responses(
        (status = 204, description = "Deleted; reserved stock released"),
        (status = 404, description = "Unknown order"),
        (status = 409, description = "A bill references this order"),
    ),
    tag = "orders",
)]
pub(crate) async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.orders.delete(OrderId::new(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
