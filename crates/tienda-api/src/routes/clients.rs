//! # Client Routes
//!
//! Registration, lookup, partial update, and soft deletion. Delete never
//! removes the row: orders and bills keep referencing the account, which
//! just stops being active.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use tienda_core::ClientId;
use tienda_domain::Client;
use tienda_postgres::{ClientUpdate, NewClient};

use crate::auth::hash_new_password;
use crate::error::AppError;
use crate::extractors::Pagination;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(get_one).put(update).delete(delete))
}

/// Registration request.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateClientRequest {
    /// Given name.
    pub name: String,
    /// Family name.
    pub lastname: String,
    /// Unique contact email.
    pub email: String,
    /// Optional phone number.
    pub phone: Option<String>,
    /// Optional plaintext password, hashed before storage.
    pub password: Option<String>,
}

/// Partial update request; absent fields stay as they are.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateClientRequest {
    /// New given name.
    pub name: Option<String>,
    /// New family name.
    pub lastname: Option<String>,
    /// New email.
    pub email: Option<String>,
    /// New phone number.
    pub phone: Option<String>,
}

/// Client representation on the wire. Credentials never appear here.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ClientResponse {
    /// Database key.
    pub id: i64,
    /// Given name.
    pub name: String,
    /// Family name.
    pub lastname: String,
    /// Contact email.
    pub email: String,
    /// Phone number.
    pub phone: Option<String>,
    /// Whether the account is active.
    pub active: bool,
    /// Deletion instant for soft-deleted accounts.
    pub deleted_at: Option<DateTime<Utc>>,
    /// Row creation instant.
    pub created_at: DateTime<Utc>,
    /// Last update instant.
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<Client> for ClientResponse {
    fn from(client: Client) -> Self {
        Self {
            id: client.id.as_i64(),
            active: client.is_active(),
            deleted_at: client.lifecycle.deleted_at(),
            name: client.name,
            lastname: client.lastname,
            email: client.email,
            phone: client.phone,
            created_at: client.created_at,
            updated_at: client.updated_at,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/clients",
    params(Pagination),
    responses((status = 200, body = [ClientResponse])),
    tag = "clients",
)]
pub(crate) async fn list(
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<ClientResponse>>, AppError> {
    let (skip, limit) = page.bounds();
    let clients = state.clients.list(skip, limit).await?;
    Ok(Json(clients.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/api/v1/clients/{id}",
    responses(
        (status = 200, body = ClientResponse),
        (status = 404, description = "Unknown client"),
    ),
    tag = "clients",
)]
pub(crate) async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ClientResponse>, AppError> {
    let client = state.clients.get(ClientId::new(id)).await?;
    Ok(Json(client.into()))
}

#[utoipa::path(
    post,
    path = "/api/v1/clients",
    request_body = CreateClientRequest,
    responses(
        (status = 201, body = ClientResponse),
        (status = 409, description = "Email already registered"),
    ),
    tag = "clients",
)]
pub(crate) async fn create(
    State(state): State<AppState>,
    Json(request): Json<CreateClientRequest>,
) -> Result<(StatusCode, Json<ClientResponse>), AppError> {
    let client = state
        .clients
        .create(NewClient {
            name: request.name,
            lastname: request.lastname,
            email: request.email,
            phone: request.phone,
            password: request.password.as_deref().map(hash_new_password),
        })
        .await?;
    Ok((StatusCode::CREATED, Json(client.into())))
}

#[utoipa::path(
    put,
    path = "/api/v1/clients/{id}",
    request_body = UpdateClientRequest,
    responses(
        (status = 200, body = ClientResponse),
        (status = 404, description = "Unknown client"),
    ),
    tag = "clients",
)]
pub(crate) async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateClientRequest>,
) -> Result<Json<ClientResponse>, AppError> {
    let client = state
        .clients
        .update(
            ClientId::new(id),
            ClientUpdate {
                name: request.name,
                lastname: request.lastname,
                email: request.email,
                phone: request.phone,
            },
        )
        .await?;
    Ok(Json(client.into()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/clients/{id}",
    responses(
        (status = 204, description = "Account soft-deleted"),
        (status = 404, description = "Unknown client"),
        (status = 409, description = "Already deleted"),
    ),
    tag = "clients",
)]
pub(crate) async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state
        .clients
        .soft_delete(ClientId::new(id), Utc::now())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
