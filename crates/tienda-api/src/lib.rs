//! # tienda-api — Axum REST Layer
//!
//! The HTTP surface of the tienda backend, built on Axum/Tower/Tokio.
//! Assembles one router per entity into a single application with shared
//! middleware for request ids, tracing, metrics, and CORS.
//!
//! ## Routes
//!
//! - `/api/v1/clients` — accounts, registration, soft deletion
//! - `/api/v1/auth/login` — credential verification
//! - `/api/v1/products`, `/api/v1/categories` — catalog
//! - `/api/v1/addresses` — shipping addresses
//! - `/api/v1/orders` — placement, lookup, status, deletion
//! - `/api/v1/order-details` — line-item mutation with stock reconciliation
//! - `/api/v1/bills`, `/api/v1/reviews` — billing documents, reviews
//! - `/api/v1/openapi.json` — generated OpenAPI document
//! - `/health`, `/health/ready` — probes (unauthenticated, unversioned)
//!
//! ## Middleware Stack (Tower)
//!
//! TraceLayer → CorsLayer → request-id → metrics
//!
//! ## Crate Policy
//!
//! - No business logic in route handlers; they translate wire shapes and
//!   delegate to `tienda-postgres` stores.
//! - All errors map to structured HTTP responses via [`AppError`].
//! - Request/response types are compile-time contracts via serde derive,
//!   documented via utoipa.

pub mod auth;
pub mod docs;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod routes;
pub mod state;

pub use error::AppError;
pub use state::AppState;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Assemble the full application for the given state.
pub fn app(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_router())
        .merge(routes::health::router())
        .layer(axum::middleware::from_fn(
            middleware::metrics::track_requests,
        ))
        .layer(axum::middleware::from_fn(
            middleware::request_id::request_id,
        ))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
