use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::payments::PaymentError;

/// Error types for the workshop order workflow
#[derive(Debug, thiserror::Error)]
pub enum WorkshopError {
    #[error("Workshop not found")]
    NotFound,

    #[error("Workshop is full")]
    WorkshopFull,

    #[error("An application for this workshop already exists for this email")]
    DuplicateApplication,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid order amount: {0}")]
    InvalidAmount(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Payment error: {0}")]
    Payment(#[from] PaymentError),
}

impl From<sqlx::Error> for WorkshopError {
    fn from(err: sqlx::Error) -> Self {
        WorkshopError::DatabaseError(err.to_string())
    }
}

impl IntoResponse for WorkshopError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            WorkshopError::NotFound => {
                (StatusCode::NOT_FOUND, "Workshop not found".to_string())
            }
            WorkshopError::WorkshopFull => {
                (StatusCode::CONFLICT, "Workshop is full".to_string())
            }
            WorkshopError::DuplicateApplication => (
                StatusCode::CONFLICT,
                "An application for this workshop already exists for this email".to_string(),
            ),
            WorkshopError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            // Internal detail is logged, never returned to the caller
            WorkshopError::InvalidAmount(detail)
            | WorkshopError::DatabaseError(detail) => {
                tracing::error!("Workshop order failed: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to create workshop order".to_string(),
                )
            }
            WorkshopError::Payment(err) => {
                tracing::error!("Workshop order failed: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to create workshop order".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
