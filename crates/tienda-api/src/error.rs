//! # Application Error
//!
//! Maps domain and store errors to structured HTTP responses. The body
//! shape is stable API surface:
//!
//! ```json
//! {"error_kind": "insufficient_stock", "message": "...", "detail": {"product_id": 1, "available": 5, "requested": 10}}
//! ```
//!
//! Status mapping: 404 for missing entities, 400 for invalid input and
//! insufficient stock, 409 for uniqueness and lifecycle conflicts, 500
//! for persistence failures (with the cause logged, never leaked).

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use tienda_core::CoreError;
use tienda_domain::{CheckoutError, DomainError};
use tienda_postgres::StoreError;

/// Application-level error type that maps to HTTP responses.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found.
    #[error("{message}")]
    NotFound {
        /// Machine-readable kind.
        error_kind: &'static str,
        /// Human-readable message.
        message: String,
    },

    /// Request rejected before any mutation.
    #[error("{message}")]
    BadRequest {
        /// Machine-readable kind.
        error_kind: &'static str,
        /// Human-readable message.
        message: String,
        /// Structured payload, e.g. available vs requested stock.
        detail: Option<serde_json::Value>,
    },

    /// The request conflicts with current state.
    #[error("{message}")]
    Conflict {
        /// Machine-readable kind.
        error_kind: &'static str,
        /// Human-readable message.
        message: String,
    },

    /// Authentication failed.
    #[error("{message}")]
    Unauthorized {
        /// Human-readable message.
        message: String,
    },

    /// Unexpected persistence failure.
    #[error("internal error")]
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_kind(&self) -> &'static str {
        match self {
            Self::NotFound { error_kind, .. }
            | Self::BadRequest { error_kind, .. }
            | Self::Conflict { error_kind, .. } => error_kind,
            Self::Unauthorized { .. } => "unauthorized",
            Self::Internal(_) => "persistence_failure",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Self::Internal(cause) = &self {
            tracing::error!(error = %cause, "request failed");
        }
        let message = match &self {
            Self::Internal(_) => "internal error".to_string(),
            other => other.to_string(),
        };
        let detail = match &self {
            Self::BadRequest { detail, .. } => detail.clone(),
            _ => None,
        };
        let mut body = serde_json::json!({
            "error_kind": self.error_kind(),
            "message": message,
        });
        if let Some(detail) = detail {
            body["detail"] = detail;
        }
        (self.status(), axum::Json(body)).into_response()
    }
}

impl From<CheckoutError> for AppError {
    fn from(err: CheckoutError) -> Self {
        match &err {
            CheckoutError::ClientNotFound(_) => Self::NotFound {
                error_kind: "client_not_found",
                message: err.to_string(),
            },
            CheckoutError::ProductNotFound(_) => Self::NotFound {
                error_kind: "product_not_found",
                message: err.to_string(),
            },
            CheckoutError::InsufficientStock {
                product_id,
                available,
                requested,
            } => Self::BadRequest {
                error_kind: "insufficient_stock",
                message: err.to_string(),
                detail: Some(serde_json::json!({
                    "product_id": product_id.as_i64(),
                    "available": available,
                    "requested": requested,
                })),
            },
            CheckoutError::InvalidLineItem(_) => Self::BadRequest {
                error_kind: "invalid_line_item",
                message: err.to_string(),
                detail: None,
            },
            CheckoutError::BillAlreadyExists(_) => Self::Conflict {
                error_kind: "bill_already_exists",
                message: err.to_string(),
            },
        }
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match &err {
            DomainError::UnknownCode { .. }
            | DomainError::RatingOutOfRange(_)
            | DomainError::TaxRateOutOfRange(_) => Self::BadRequest {
                error_kind: "validation",
                message: err.to_string(),
                detail: None,
            },
            DomainError::InvalidTransition { .. } => Self::Conflict {
                error_kind: "invalid_transition",
                message: err.to_string(),
            },
            DomainError::AlreadyDeleted(_) => Self::Conflict {
                error_kind: "already_deleted",
                message: err.to_string(),
            },
        }
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        Self::BadRequest {
            error_kind: "validation",
            message: err.to_string(),
            detail: None,
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Checkout(e) => e.into(),
            StoreError::Domain(e) => e.into(),
            StoreError::RowNotFound { .. } => Self::NotFound {
                error_kind: "not_found",
                message: err.to_string(),
            },
            StoreError::Conflict(_) => Self::Conflict {
                error_kind: "conflict",
                message: err.to_string(),
            },
            StoreError::ForeignKey(_) => Self::Conflict {
                error_kind: "constraint_violation",
                message: err.to_string(),
            },
            StoreError::UnverifiedPurchase => Self::BadRequest {
                error_kind: "unverified_purchase",
                message: err.to_string(),
                detail: None,
            },
            StoreError::NumberingExhausted(_) | StoreError::Database(_) => {
                Self::Internal(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tienda_core::{ClientId, OrderId, ProductId};

    #[test]
    fn test_insufficient_stock_maps_to_400_with_detail() {
        let err = AppError::from(CheckoutError::InsufficientStock {
            product_id: ProductId::new(1),
            available: 5,
            requested: 10,
        });
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        match err {
            AppError::BadRequest { error_kind, detail, .. } => {
                assert_eq!(error_kind, "insufficient_stock");
                let detail = detail.expect("detail payload");
                assert_eq!(detail["available"], 5);
                assert_eq!(detail["requested"], 10);
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn test_missing_entities_map_to_404() {
        let client = AppError::from(CheckoutError::ClientNotFound(ClientId::new(9)));
        assert_eq!(client.status(), StatusCode::NOT_FOUND);
        let product = AppError::from(CheckoutError::ProductNotFound(ProductId::new(9)));
        assert_eq!(product.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_bill_conflict_maps_to_409() {
        let err = AppError::from(CheckoutError::BillAlreadyExists(OrderId::new(3)));
        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert_eq!(err.error_kind(), "bill_already_exists");
    }

    #[test]
    fn test_internal_errors_do_not_leak_the_cause() {
        let err = AppError::Internal("connection reset by postgres".to_string());
        match &err {
            AppError::Internal(cause) => assert!(cause.contains("postgres")),
            other => panic!("unexpected variant: {other:?}"),
        }
        // The response body must only carry the generic message.
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
