use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Error types for analytics operations
///
/// Only the sync side surfaces these; the query service swallows its errors
/// and degrades to empty results.
#[derive(Debug, thiserror::Error)]
pub enum AnalyticsError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Unknown sync domain: {0}")]
    UnknownDomain(String),
}

impl From<sqlx::Error> for AnalyticsError {
    fn from(err: sqlx::Error) -> Self {
        AnalyticsError::DatabaseError(err.to_string())
    }
}

impl IntoResponse for AnalyticsError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AnalyticsError::UnknownDomain(domain) => (
                StatusCode::BAD_REQUEST,
                format!("Unknown sync domain: {}", domain),
            ),
            AnalyticsError::DatabaseError(detail) => {
                tracing::error!("Analytics sync failed: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Analytics sync failed".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
