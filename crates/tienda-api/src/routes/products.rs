//! # Product Routes
//!
//! Catalog CRUD. The `stock` field here is a catalog edit (absolute
//! level); order placement and line-item mutation are the only paths
//! that reserve or release units.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use tienda_core::{CategoryId, Money, ProductId};
use tienda_domain::Product;
use tienda_postgres::{NewProduct, ProductUpdate};

use crate::error::AppError;
use crate::extractors::Pagination;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(get_one).put(update).delete(delete))
}

/// Optional category restriction for listing.
#[derive(Debug, Clone, Copy, Deserialize, IntoParams)]
pub struct CategoryFilter {
    /// Only products in this category.
    pub category_id: Option<i64>,
}

/// Catalog creation request.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    /// Display name.
    pub name: String,
    /// Unit price, positive.
    pub price: f64,
    /// Initial stock.
    #[serde(default)]
    pub stock: u32,
    /// Optional description.
    pub description: Option<String>,
    /// Owning category.
    pub category_id: Option<i64>,
}

/// Partial update request.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    /// New name.
    pub name: Option<String>,
    /// New unit price.
    pub price: Option<f64>,
    /// New absolute stock level.
    pub stock: Option<u32>,
    /// New description.
    pub description: Option<String>,
    /// New category.
    pub category_id: Option<i64>,
}

/// Product representation on the wire.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProductResponse {
    /// Database key.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Current unit price.
    pub price: f64,
    /// Units available.
    pub stock: u32,
    /// Description.
    pub description: Option<String>,
    /// Owning category.
    pub category_id: Option<i64>,
    /// Row creation instant.
    pub created_at: DateTime<Utc>,
    /// Last update instant.
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id.as_i64(),
            name: product.name,
            price: product.price.to_f64(),
            stock: product.stock,
            description: product.description,
            category_id: product.category_id.map(|c| c.as_i64()),
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/products",
    params(Pagination, CategoryFilter),
    responses((status = 200, body = [ProductResponse])),
    tag = "products",
)]
pub(crate) async fn list(
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
    Query(filter): Query<CategoryFilter>,
) -> Result<Json<Vec<ProductResponse>>, AppError> {
    let (skip, limit) = page.bounds();
    let products = state
        .products
        .list(filter.category_id.map(CategoryId::new), skip, limit)
        .await?;
    Ok(Json(products.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/api/v1/products/{id}",
    responses(
        (status = 200, body = ProductResponse),
        (status = 404, description = "Unknown product"),
    ),
    tag = "products",
)]
pub(crate) async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ProductResponse>, AppError> {
    let product = state.products.get(ProductId::new(id)).await?;
    Ok(Json(product.into()))
}

#[utoipa::path(
    post,
    path = "/api/v1/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, body = ProductResponse),
        (status = 400, description = "Invalid price"),
    ),
    tag = "products",
)]
pub(crate) async fn create(
    State(state): State<AppState>,
    Json(request): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<ProductResponse>), AppError> {
    let price = Money::from_f64(request.price)?;
    if !price.is_positive() {
        return Err(AppError::BadRequest {
            error_kind: "validation",
            message: "price must be positive".to_string(),
            detail: None,
        });
    }
    let product = state
        .products
        .create(NewProduct {
            name: request.name,
            price,
            stock: request.stock,
            description: request.description,
            category_id: request.category_id.map(CategoryId::new),
        })
        .await?;
    Ok((StatusCode::CREATED, Json(product.into())))
}

#[utoipa::path(
    put,
    path = "/api/v1/products/{id}",
    request_body = UpdateProductRequest,
    responses(
        (status = 200, body = ProductResponse),
        (status = 404, description = "Unknown product"),
    ),
    tag = "products",
)]
pub(crate) async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateProductRequest>,
) -> Result<Json<ProductResponse>, AppError> {
    let price = request.price.map(Money::from_f64).transpose()?;
    if let Some(price) = price {
        if !price.is_positive() {
            return Err(AppError::BadRequest {
                error_kind: "validation",
                message: "price must be positive".to_string(),
                detail: None,
            });
        }
    }
    let product = state
        .products
        .update(
            ProductId::new(id),
            ProductUpdate {
                name: request.name,
                price,
                stock: request.stock,
                description: request.description,
                category_id: request.category_id.map(CategoryId::new),
            },
        )
        .await?;
    Ok(Json(product.into()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/products/{id}",
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Unknown product"),
        (status = 409, description = "Referenced by order history"),
    ),
    tag = "products",
)]
pub(crate) async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.products.delete(ProductId::new(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
