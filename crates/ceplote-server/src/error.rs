//! Server-specific error types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::api::response::ErrorResponse;

/// Result type alias for HTTP handlers
pub type ApiResult<T> = std::result::Result<T, AppError>;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Store error: {0}")]
    Store(#[from] crate::store::StoreError),

    #[error("Sheet error: {0}")]
    Sheet(#[from] crate::sheet::SheetError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::Database(ref e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "A database error occurred".to_string(),
                )
            },
            AppError::Store(ref e) => {
                tracing::error!("Store error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "A storage error occurred".to_string(),
                )
            },
            AppError::Sheet(ref e) => {
                // Column misses and unreadable uploads are the caller's input
                (StatusCode::BAD_REQUEST, "INVALID_SHEET", e.to_string())
            },
            AppError::NotFound(ref message) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND", message.clone())
            },
            AppError::BadRequest(ref message) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", message.clone())
            },
            AppError::Conflict(ref message) => {
                (StatusCode::CONFLICT, "CONFLICT", message.clone())
            },
            AppError::Internal(ref message) => {
                tracing::error!("Internal error: {}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            },
            AppError::Io(ref e) => {
                tracing::error!("IO error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An IO error occurred".to_string(),
                )
            },
        };

        let body = ErrorResponse::new(code, message);
        (status, Json(body)).into_response()
    }
}
