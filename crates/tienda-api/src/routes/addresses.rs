//! # Address Routes
//!
//! Shipping addresses hang off a client; listing is per client rather
//! than global.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use tienda_core::{AddressId, ClientId};
use tienda_domain::Address;
use tienda_postgres::AddressInput;

use crate::error::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(get_one).put(update).delete(delete))
}

/// Owner filter for listing.
#[derive(Debug, Clone, Copy, Deserialize, IntoParams)]
pub struct ClientFilter {
    /// The owning client.
    pub client_id: i64,
}

/// Creation request.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateAddressRequest {
    /// Owning client.
    pub client_id: i64,
    /// Street line.
    pub street: Option<String>,
    /// City.
    pub city: Option<String>,
    /// State or province.
    pub state: Option<String>,
    /// Postal code.
    pub zip_code: Option<String>,
}

/// Update request; absent fields stay as they are.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateAddressRequest {
    /// Street line.
    pub street: Option<String>,
    /// City.
    pub city: Option<String>,
    /// State or province.
    pub state: Option<String>,
    /// Postal code.
    pub zip_code: Option<String>,
}

/// Address representation on the wire.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AddressResponse {
    /// Database key.
    pub id: i64,
    /// Owning client.
    pub client_id: i64,
    /// Street line.
    pub street: Option<String>,
    /// City.
    pub city: Option<String>,
    /// State or province.
    pub state: Option<String>,
    /// Postal code.
    pub zip_code: Option<String>,
}

impl From<Address> for AddressResponse {
    fn from(address: Address) -> Self {
        Self {
            id: address.id.as_i64(),
            client_id: address.client_id.as_i64(),
            street: address.street,
            city: address.city,
            state: address.state,
            zip_code: address.zip_code,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/addresses",
    params(ClientFilter),
    responses((status = 200, body = [AddressResponse])),
    tag = "addresses",
)]
pub(crate) async fn list(
    State(state): State<AppState>,
    Query(filter): Query<ClientFilter>,
) -> Result<Json<Vec<AddressResponse>>, AppError> {
    let addresses = state
        .addresses
        .list_for_client(ClientId::new(filter.client_id))
        .await?;
    Ok(Json(addresses.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/api/v1/addresses/{id}",
    responses(
        (status = 200, body = AddressResponse),
        (status = 404, description = "Unknown address"),
    ),
    tag = "addresses",
)]
pub(crate) async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<AddressResponse>, AppError> {
    let address = state.addresses.get(AddressId::new(id)).await?;
    Ok(Json(address.into()))
}

#[utoipa::path(
    post,
    path = "/api/v1/addresses",
    request_body = CreateAddressRequest,
    responses(
        (status = 201, body = AddressResponse),
        (status = 409, description = "Unknown client"),
    ),
    tag = "addresses",
)]
pub(crate) async fn create(
    State(state): State<AppState>,
    Json(request): Json<CreateAddressRequest>,
) -> Result<(StatusCode, Json<AddressResponse>), AppError> {
    let address = state
        .addresses
        .create(
            ClientId::new(request.client_id),
            AddressInput {
                street: request.street,
                city: request.city,
                state: request.state,
                zip_code: request.zip_code,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(address.into())))
}

#[utoipa::path(
    put,
    path = "/api/v1/addresses/{id}",
    request_body = UpdateAddressRequest,
    responses(
        (status = 200, body = AddressResponse),
        (status = 404, description = "Unknown address"),
    ),
    tag = "addresses",
)]
pub(crate) async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateAddressRequest>,
) -> Result<Json<AddressResponse>, AppError> {
    let address = state
        .addresses
        .update(
            AddressId::new(id),
            AddressInput {
                street: request.street,
                city: request.city,
                state: request.state,
                zip_code: request.zip_code,
            },
        )
        .await?;
    Ok(Json(address.into()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/addresses/{id}",
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Unknown address"),
    ),
    tag = "addresses",
)]
pub(crate) async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.addresses.delete(AddressId::new(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
