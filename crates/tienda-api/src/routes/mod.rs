//! # Route Modules
//!
//! Each module defines an Axum router for one API surface area plus its
//! request/response types. Routers are assembled here and mounted under
//! `/api/v1` in `lib.rs`. No business logic in handlers; they translate
//! the wire shapes and delegate to the stores.

use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

pub mod addresses;
pub mod bills;
pub mod categories;
pub mod clients;
pub mod health;
pub mod order_details;
pub mod orders;
pub mod products;
pub mod reviews;

/// Assemble the versioned API surface.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .nest("/clients", clients::router())
        .nest("/products", products::router())
        .nest("/categories", categories::router())
        .nest("/addresses", addresses::router())
        .nest("/orders", orders::router())
        .nest("/order-details", order_details::router())
        .nest("/bills", bills::router())
        .nest("/reviews", reviews::router())
        .route("/auth/login", post(crate::auth::login))
        .route("/openapi.json", get(crate::docs::openapi_json))
}
