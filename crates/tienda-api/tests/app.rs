//! Router-level tests that run without a database. The pool is built
//! lazily, so anything short of an actual query works; these cover
//! routing, input validation ahead of the store, and the error body
//! shape.

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;

use tienda_api::AppState;
use tienda_domain::TaxRate;

fn test_app() -> axum::Router {
    let pool = PgPoolOptions::new()
        .connect_lazy("postgres://localhost/tienda_unreachable")
        .expect("lazy pool construction never connects");
    tienda_api::app(AppState::new(pool, TaxRate::default()))
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}

#[tokio::test]
async fn liveness_answers_without_a_database() {
    let response = test_app()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "ok");
}

#[tokio::test]
async fn unknown_routes_are_404() {
    let response = test_app()
        .oneshot(Request::get("/api/v1/nonsense").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn placement_rejects_an_unknown_delivery_method_before_touching_the_store() {
    let payload = serde_json::json!({
        "client_id": 1,
        "delivery_method": 9,
        "order_details": [{"product_id": 1, "quantity": 1}],
    });
    let response = test_app()
        .oneshot(
            Request::post("/api/v1/orders")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error_kind"], "validation");
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("delivery method"));
}

#[tokio::test]
async fn responses_echo_a_request_id() {
    let response = test_app()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn supplied_request_ids_are_preserved() {
    let id = "3f2b8c1a-5d4e-4f6a-9b8c-1a2b3c4d5e6f";
    let response = test_app()
        .oneshot(
            Request::get("/health")
                .header("x-request-id", id)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.headers()["x-request-id"], id);
}

#[tokio::test]
async fn openapi_document_is_served() {
    let response = test_app()
        .oneshot(
            Request::get("/api/v1/openapi.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["paths"]["/api/v1/orders"].is_object());
}
