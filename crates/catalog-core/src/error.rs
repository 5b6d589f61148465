//! Error types for the catalogue.

use thiserror::Error;
use uuid::Uuid;

/// Result type alias using the catalogue's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for catalogue operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Category not found
    #[error("Category not found: {0}")]
    CategoryNotFound(Uuid),

    /// Product not found
    #[error("Product not found: {0}")]
    ProductNotFound(Uuid),

    /// A parent chain loops back on itself or exceeds the depth bound.
    #[error("Category hierarchy cycle detected at {id} (depth {depth})")]
    CycleDetected { id: Uuid, depth: usize },

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Unique or referential constraint prevented the write
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Authentication failed
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_not_found() {
        let err = Error::NotFound("test resource".to_string());
        assert_eq!(err.to_string(), "Not found: test resource");
    }

    #[test]
    fn test_error_display_category_not_found() {
        let id = Uuid::nil();
        let err = Error::CategoryNotFound(id);
        assert_eq!(err.to_string(), format!("Category not found: {}", id));
    }

    #[test]
    fn test_error_display_cycle_detected() {
        let id = Uuid::nil();
        let err = Error::CycleDetected { id, depth: 65 };
        assert_eq!(
            err.to_string(),
            format!("Category hierarchy cycle detected at {} (depth 65)", id)
        );
    }

    #[test]
    fn test_error_display_conflict() {
        let err = Error::Conflict("slug already exists".to_string());
        assert_eq!(err.to_string(), "Conflict: slug already exists");
    }

    #[test]
    fn test_error_display_invalid_input() {
        let err = Error::InvalidInput("empty name".to_string());
        assert_eq!(err.to_string(), "Invalid input: empty name");
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<i32>("not a number").unwrap_err();
        let err: Error = json_err.into();
        match err {
            Error::Serialization(msg) => assert!(!msg.is_empty()),
            _ => panic!("Expected Serialization error"),
        }
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }

    #[test]
    fn test_error_debug_format() {
        let err = Error::CycleDetected {
            id: Uuid::nil(),
            depth: 2,
        };
        let debug_str = format!("{:?}", err);
        assert!(debug_str.contains("CycleDetected"));
    }
}
