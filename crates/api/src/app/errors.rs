use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use storefront_core::DomainError;
use storefront_infra::StoreError;
use storefront_orders::OrderStatus;

pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    match err {
        StoreError::Domain(e) => domain_error_to_response(e),
        StoreError::Database(e) => {
            tracing::error!(error = %e, "database error");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "database_error", e.to_string())
        }
        StoreError::Corrupt(msg) => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "corrupt_row", msg)
        }
    }
}

fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
        DomainError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        DomainError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        err @ DomainError::InsufficientStock { .. } => {
            json_error(StatusCode::CONFLICT, "insufficient_stock", err.to_string())
        }
        DomainError::InvariantViolation(msg) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "invariant_violation", msg)
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

pub fn parse_order_status(s: &str) -> Result<OrderStatus, axum::response::Response> {
    match s.to_lowercase().as_str() {
        "ordered" => Ok(OrderStatus::Ordered),
        "canceled" => Ok(OrderStatus::Canceled),
        _ => Err(json_error(
            StatusCode::BAD_REQUEST,
            "invalid_order_status",
            "status must be one of: ordered, canceled",
        )),
    }
}
