//! Error types for todo-core

use thiserror::Error;

use crate::config::ConfigError;

/// Result type alias for todo operations
pub type Result<T> = std::result::Result<T, TodoError>;

/// Main error type for todo operations
#[derive(Error, Debug)]
pub enum TodoError {
    /// Input rejected before any store was touched
    #[error("Validation error: {0}")]
    Validation(String),

    /// Remote store errors
    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),

    /// Local storage errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Not found
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Errors reported by a remote store call.
///
/// Every variant means "store unreachable for this operation" to the
/// reconciler; only `NotFound` is treated differently on delete.
#[derive(Error, Debug)]
pub enum RemoteError {
    /// Transport-level failure (connection refused, reset, timeout)
    #[error("Request failed: {message}")]
    RequestFailed { message: String },

    /// Non-2xx response other than 404
    #[error("Unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    /// The store does not know the id
    #[error("Not found")]
    NotFound,

    /// Response body could not be decoded
    #[error("Parse error: {message}")]
    ParseError { message: String },

    /// The store was switched off (in-memory store only)
    #[error("Remote store unavailable")]
    Unavailable,
}

impl RemoteError {
    /// Whether the store answered that the id does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, RemoteError::NotFound)
    }
}

/// Local slot storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    /// IO error
    #[error("IO error: {0}")]
    Io(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for TodoError {
    fn from(err: serde_json::Error) -> Self {
        TodoError::Storage(StorageError::Serialization(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_detection() {
        assert!(RemoteError::NotFound.is_not_found());
        assert!(!RemoteError::Unavailable.is_not_found());
        assert!(!RemoteError::Status {
            status: 500,
            body: String::new()
        }
        .is_not_found());
    }

    #[test]
    fn test_storage_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: TodoError = StorageError::from(io).into();
        assert!(err.to_string().contains("denied"));
    }
}
