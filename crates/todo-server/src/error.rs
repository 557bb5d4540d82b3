//! Error types for todo-server

use axum::{http::StatusCode, Json};
use serde_json::{json, Value};
use thiserror::Error;

/// Result type alias for persistence operations
pub type Result<T> = std::result::Result<T, PersistenceError>;

/// Persistence-specific errors
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// Stored value could not be decoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(String),
}

impl From<rusqlite::Error> for PersistenceError {
    fn from(err: rusqlite::Error) -> Self {
        PersistenceError::Database(err.to_string())
    }
}

impl From<std::io::Error> for PersistenceError {
    fn from(err: std::io::Error) -> Self {
        PersistenceError::Io(err.to_string())
    }
}

/// Error half of every handler result: a status and an `{"error": ...}` body
pub type ApiError = (StatusCode, Json<Value>);

/// Build an [`ApiError`]
pub fn api_error(status: StatusCode, message: impl std::fmt::Display) -> ApiError {
    (status, Json(json!({ "error": message.to_string() })))
}

impl From<PersistenceError> for (StatusCode, Json<Value>) {
    fn from(err: PersistenceError) -> Self {
        tracing::error!("{}", err);
        api_error(StatusCode::INTERNAL_SERVER_ERROR, err)
    }
}
