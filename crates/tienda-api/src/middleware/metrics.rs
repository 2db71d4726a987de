//! # HTTP Metrics Middleware
//!
//! Counts every request by method, path, and response status. The
//! Prometheus exporter is installed by the binary; handlers and stores
//! add their own domain counters on top.

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;

/// The middleware function; install with `axum::middleware::from_fn`.
pub async fn track_requests(req: Request, next: Next) -> Response {
    let method = req.method().to_string();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;

    metrics::counter!(
        "tienda_http_requests_total",
        "method" => method,
        "path" => path,
        "status" => response.status().as_u16().to_string(),
    )
    .increment(1);

    response
}
