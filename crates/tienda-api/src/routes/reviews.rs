//! # Review Routes
//!
//! Purchase-verified reviews: creation names the order the product was
//! bought in, and the store rejects the review unless that purchase
//! exists for the reviewing client.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use tienda_core::{ClientId, OrderId, ProductId, ReviewId};
use tienda_domain::{Rating, Review};

use crate::error::AppError;
use crate::extractors::Pagination;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create))
        .route("/{id}", get(get_one).delete(delete))
        .route("/by-product/{product_id}", get(list_by_product))
}

/// Creation request.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateReviewRequest {
    /// Star rating, 1.0 to 5.0.
    pub rating: f64,
    /// Optional free-text comment.
    pub comment: Option<String>,
    /// Reviewed product.
    pub product_id: i64,
    /// Reviewing client.
    pub client_id: i64,
    /// The order the product was purchased in.
    pub order_id: i64,
}

/// Review representation on the wire.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReviewResponse {
    /// Database key.
    pub id: i64,
    /// Star rating.
    pub rating: f64,
    /// Comment.
    pub comment: Option<String>,
    /// Reviewed product.
    pub product_id: i64,
    /// Reviewing client.
    pub client_id: i64,
    /// The purchase the review is tied to.
    pub order_id: i64,
    /// Row creation instant.
    pub created_at: DateTime<Utc>,
}

impl From<Review> for ReviewResponse {
    fn from(review: Review) -> Self {
        Self {
            id: review.id.as_i64(),
            rating: review.rating.as_decimal().to_f64().unwrap_or(0.0),
            comment: review.comment,
            product_id: review.product_id.as_i64(),
            client_id: review.client_id.as_i64(),
            order_id: review.order_id.as_i64(),
            created_at: review.created_at,
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/reviews",
    request_body = CreateReviewRequest,
    responses(
        (status = 201, body = ReviewResponse),
        (status = 400, description = "Rating out of range or purchase not verified"),
    ),
    tag = "reviews",
)]
pub(crate) async fn create(
    State(state): State<AppState>,
    Json(request): Json<CreateReviewRequest>,
) -> Result<(StatusCode, Json<ReviewResponse>), AppError> {
    let rating = Decimal::from_f64_retain(request.rating)
        .ok_or(AppError::BadRequest {
            error_kind: "validation",
            message: format!("invalid rating: {}", request.rating),
            detail: None,
        })
        .and_then(|d| Rating::new(d.round_dp(1)).map_err(Into::into))?;

    let review = state
        .reviews
        .create(
            rating,
            request.comment.as_deref(),
            ProductId::new(request.product_id),
            ClientId::new(request.client_id),
            OrderId::new(request.order_id),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(review.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/reviews/{id}",
    responses(
        (status = 200, body = ReviewResponse),
        (status = 404, description = "Unknown review"),
    ),
    tag = "reviews",
)]
pub(crate) async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ReviewResponse>, AppError> {
    let review = state.reviews.get(ReviewId::new(id)).await?;
    Ok(Json(review.into()))
}

#[utoipa::path(
    get,
    path = "/api/v1/reviews/by-product/{product_id}",
    params(Pagination),
    responses((status = 200, body = [ReviewResponse])),
    tag = "reviews",
)]
pub(crate) async fn list_by_product(
    State(state): State<AppState>,
    Path(product_id): Path<i64>,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<ReviewResponse>>, AppError> {
    let (skip, limit) = page.bounds();
    let reviews = state
        .reviews
        .list_for_product(ProductId::new(product_id), skip, limit)
        .await?;
    Ok(Json(reviews.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/reviews/{id}",
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Unknown review"),
    ),
    tag = "reviews",
)]
pub(crate) async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.reviews.delete(ReviewId::new(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
