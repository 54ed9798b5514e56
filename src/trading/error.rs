use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::payments::PaymentError;

/// Error types for the service booking workflow
#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("Service not found")]
    NotFound,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid order amount: {0}")]
    InvalidAmount(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Payment error: {0}")]
    Payment(#[from] PaymentError),
}

impl From<sqlx::Error> for BookingError {
    fn from(err: sqlx::Error) -> Self {
        BookingError::DatabaseError(err.to_string())
    }
}

impl IntoResponse for BookingError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            BookingError::NotFound => {
                (StatusCode::NOT_FOUND, "Service not found".to_string())
            }
            BookingError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            // Internal detail is logged, never returned to the caller
            BookingError::InvalidAmount(detail) | BookingError::DatabaseError(detail) => {
                tracing::error!("Service order failed: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to create service order".to_string(),
                )
            }
            BookingError::Payment(err) => {
                tracing::error!("Service order failed: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to create service order".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
