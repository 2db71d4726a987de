//! # Category Routes

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use tienda_core::CategoryId;
use tienda_domain::Category;

use crate::error::AppError;
use crate::extractors::Pagination;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(get_one).put(update).delete(delete))
}

/// Creation and update request.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CategoryRequest {
    /// Unique category name. Required on create.
    pub name: Option<String>,
    /// Optional description.
    pub description: Option<String>,
}

/// Category representation on the wire.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CategoryResponse {
    /// Database key.
    pub id: i64,
    /// Category name.
    pub name: String,
    /// Description.
    pub description: Option<String>,
}

impl From<Category> for CategoryResponse {
    fn from(category: Category) -> Self {
        Self {
            id: category.id.as_i64(),
            name: category.name,
            description: category.description,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/categories",
    params(Pagination),
    responses((status = 200, body = [CategoryResponse])),
    tag = "categories",
)]
pub(crate) async fn list(
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<CategoryResponse>>, AppError> {
    let (skip, limit) = page.bounds();
    let categories = state.categories.list(skip, limit).await?;
    Ok(Json(categories.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/api/v1/categories/{id}",
    responses(
        (status = 200, body = CategoryResponse),
        (status = 404, description = "Unknown category"),
    ),
    tag = "categories",
)]
pub(crate) async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<CategoryResponse>, AppError> {
    let category = state.categories.get(CategoryId::new(id)).await?;
    Ok(Json(category.into()))
}

#[utoipa::path(
    post,
    path = "/api/v1/categories",
    request_body = CategoryRequest,
    responses(
        (status = 201, body = CategoryResponse),
        (status = 409, description = "Name already taken"),
    ),
    tag = "categories",
)]
pub(crate) async fn create(
    State(state): State<AppState>,
    Json(request): Json<CategoryRequest>,
) -> Result<(StatusCode, Json<CategoryResponse>), AppError> {
    let name = request.name.as_deref().ok_or_else(|| AppError::BadRequest {
        error_kind: "validation",
        message: "name is required".to_string(),
        detail: None,
    })?;
    let category = state
        .categories
        .create(name, request.description.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(category.into())))
}

#[utoipa::path(
    put,
    path = "/api/v1/categories/{id}",
    request_body = CategoryRequest,
    responses(
        (status = 200, body = CategoryResponse),
        (status = 404, description = "Unknown category"),
    ),
    tag = "categories",
)]
pub(crate) async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<CategoryRequest>,
) -> Result<Json<CategoryResponse>, AppError> {
    let category = state
        .categories
        .update(
            CategoryId::new(id),
            request.name.as_deref(),
            request.description.as_deref(),
        )
        .await?;
    Ok(Json(category.into()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/categories/{id}",
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Unknown category"),
        (status = 409, description = "Still referenced by products"),
    ),
    tag = "categories",
)]
pub(crate) async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.categories.delete(CategoryId::new(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
