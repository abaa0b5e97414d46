//! Custom error types for the API service
//!
//! The domain taxonomy (not found, conflict, invalid state, validation)
//! is surfaced to the caller as-is; infrastructure failures are logged
//! and collapsed into a generic 500.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Custom error type for the API service
#[derive(Error, Debug)]
pub enum ApiError {
    /// Referenced entity absent
    #[error("{0}")]
    NotFound(String),

    /// Scheduling overlap or duplicate unique field
    #[error("{0}")]
    Conflict(String),

    /// Illegal status transition
    #[error("{0}")]
    InvalidState(String),

    /// Malformed input
    #[error("{0}")]
    Validation(String),

    /// Missing or invalid session
    #[error("Unauthorized")]
    Unauthorized,

    /// Caller lacks the role for this operation
    #[error("Forbidden")]
    Forbidden,

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),

    /// Internal server error
    #[error("Internal server error")]
    Internal,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::InvalidState(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            ApiError::Forbidden => (StatusCode::FORBIDDEN, "Forbidden".to_string()),
            ApiError::Database(err) => {
                error!("Database error: {:#}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error".to_string(),
                )
            }
            ApiError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;
