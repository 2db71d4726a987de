//! # OpenAPI Document
//!
//! Aggregates the handler annotations and schema derives into one
//! OpenAPI document, served at `/api/v1/openapi.json`.

use axum::Json;
use utoipa::OpenApi;

use crate::routes;

/// The assembled API description.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "tienda",
        description = "E-commerce REST backend: catalog, clients, order placement with stock reservation, billing, reviews."
    ),
    paths(
        crate::auth::login,
        routes::clients::list,
        routes::clients::get_one,
        routes::clients::create,
        routes::clients::update,
        routes::clients::delete,
        routes::products::list,
        routes::products::get_one,
        routes::products::create,
        routes::products::update,
        routes::products::delete,
        routes::categories::list,
        routes::categories::get_one,
        routes::categories::create,
        routes::categories::update,
        routes::categories::delete,
        routes::addresses::list,
        routes::addresses::get_one,
        routes::addresses::create,
        routes::addresses::update,
        routes::addresses::delete,
        routes::orders::place,
        routes::orders::list,
        routes::orders::get_one,
        routes::orders::update_status,
        routes::orders::delete,
        routes::order_details::list,
        routes::order_details::get_one,
        routes::order_details::create,
        routes::order_details::update,
        routes::order_details::delete,
        routes::bills::list,
        routes::bills::get_one,
        routes::bills::get_by_order,
        routes::bills::list_by_client,
        routes::reviews::create,
        routes::reviews::get_one,
        routes::reviews::list_by_product,
        routes::reviews::delete,
    ),
    components(schemas(
        crate::auth::LoginRequest,
        crate::auth::LoginResponse,
        routes::clients::CreateClientRequest,
        routes::clients::UpdateClientRequest,
        routes::clients::ClientResponse,
        routes::products::CreateProductRequest,
        routes::products::UpdateProductRequest,
        routes::products::ProductResponse,
        routes::categories::CategoryRequest,
        routes::categories::CategoryResponse,
        routes::addresses::CreateAddressRequest,
        routes::addresses::UpdateAddressRequest,
        routes::addresses::AddressResponse,
        routes::orders::PlaceOrderRequest,
        routes::orders::OrderDetailRequest,
        routes::orders::PlaceOrderResponse,
        routes::orders::UpdateOrderStatusRequest,
        routes::orders::OrderResponse,
        routes::orders::OrderDetailResponse,
        routes::orders::OrderWithDetailsResponse,
        routes::order_details::CreateOrderDetailRequest,
        routes::order_details::UpdateOrderDetailRequest,
        routes::bills::BillResponse,
        routes::reviews::CreateReviewRequest,
        routes::reviews::ReviewResponse,
    ))
)]
pub struct ApiDoc;

/// Serve the document as JSON.
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_contains_the_placement_path() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/v1/orders"));
        assert!(doc.paths.paths.contains_key("/api/v1/orders/{id}"));
        assert!(doc.paths.paths.contains_key("/api/v1/auth/login"));
    }
}
