//! Custom error types for the users service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::service::UserError;

/// Custom error type for the users service
#[derive(Error, Debug)]
pub enum ApiError {
    /// Bad request with message
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Request body is not a valid JSON user
    #[error("Invalid JSON body: {0}")]
    Json(#[from] axum::extract::rejection::JsonRejection),

    /// Malformed or oversized multipart body
    #[error("Multipart error: {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),

    /// Referenced resource does not exist
    #[error("{0}")]
    NotFound(String),

    /// Write rejected by a uniqueness rule
    #[error("{0}")]
    Conflict(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] common::error::DatabaseError),

    /// Photo storage error
    #[error("Storage error: {0}")]
    Storage(#[from] common::error::StorageError),
}

impl From<UserError> for ApiError {
    fn from(error: UserError) -> Self {
        let message = error.to_string();
        match error {
            UserError::NotFound(_) => ApiError::NotFound(message),
            UserError::AlreadyExists => ApiError::Conflict(message),
            UserError::Storage(e) => ApiError::Storage(e),
            UserError::Database(e) => ApiError::Database(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Json(e) => (e.status(), e.body_text()),
            ApiError::Multipart(e) => (e.status(), e.body_text()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Database(e) => {
                error!("Database failure: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error".to_string(),
                )
            }
            ApiError::Storage(e) => {
                error!("Photo storage failure: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;
