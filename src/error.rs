//! Application error types for the carolcard backend.
//!
//! Provides a unified error type that implements `IntoResponse` for Axum.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::db::DbError;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    /// SQLite-specific errors (for direct rusqlite usage)
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Configuration loading/parsing errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Card message missing, blank, or too long
    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    /// Genre outside the recognized enumeration
    #[error("Invalid genre: {0}")]
    InvalidGenre(String),

    /// KPOP selection without an artist group
    #[error("K-pop artist group is required")]
    ArtistGroupRequired,

    /// Explicitly chosen song does not match the selection criteria
    #[error("Invalid song selection: {0}")]
    InvalidSelection(String),

    /// Catalog holds no song matching the criteria
    #[error("No candidate songs: {0}")]
    NoCandidates(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// External provider failure
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, message) = match &self {
            AppError::Database(e) => {
                // Log full error details but don't expose to client
                tracing::error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
            }
            AppError::Sqlite(e) => {
                tracing::error!("SQLite error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
            }
            AppError::Config(e) => {
                tracing::error!("Config error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "configuration_error",
                    None,
                )
            }
            AppError::InvalidMessage(msg) => (
                StatusCode::BAD_REQUEST,
                "invalid_message",
                Some(msg.clone()),
            ),
            AppError::InvalidGenre(msg) => {
                (StatusCode::BAD_REQUEST, "invalid_genre", Some(msg.clone()))
            }
            AppError::ArtistGroupRequired => (
                StatusCode::BAD_REQUEST,
                "artist_group_required",
                Some("K-pop artist group is required".to_string()),
            ),
            AppError::InvalidSelection(msg) => (
                StatusCode::BAD_REQUEST,
                "invalid_selection",
                Some(msg.clone()),
            ),
            AppError::NoCandidates(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "no_candidates",
                Some(msg.clone()),
            ),
            AppError::NotFound(resource) => {
                (StatusCode::NOT_FOUND, "not_found", Some(resource.clone()))
            }
            AppError::Upstream(msg) => {
                // Recommendation handlers convert this into the local
                // fallback; anything that reaches the boundary is logged.
                tracing::error!("Upstream error: {}", msg);
                (StatusCode::BAD_GATEWAY, "upstream_error", None)
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
