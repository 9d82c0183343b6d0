//! Error types for FreshKart.

use thiserror::Error;

/// Common infrastructure error type for FreshKart.
#[derive(Error, Debug)]
pub enum FreshkartError {
    /// Database error.
    ///
    /// Wraps errors from the sqlx SQLite backend.
    #[error("database error: {0}")]
    Database(String),

    /// Database connection error.
    #[error("database connection error: {0}")]
    DatabaseConnection(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Validation error for user input or configuration values.
    #[error("validation error: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Unique constraint violated.
    #[error("{0} already exists")]
    Duplicate(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<sqlx::Error> for FreshkartError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = e {
            if db_err.is_unique_violation() {
                return FreshkartError::Duplicate("record".to_string());
            }
        }
        FreshkartError::Database(e.to_string())
    }
}

/// Result type alias for FreshKart infrastructure operations.
pub type Result<T> = std::result::Result<T, FreshkartError>;
