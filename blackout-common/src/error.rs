//! Common error types for the blackout services

use thiserror::Error;

/// Common result type for blackout operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the blackout crates
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Stored row violates a data invariant (bad timestamp, inverted interval, unknown type)
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}
