//! Common error types for MoodTunes

use thiserror::Error;

/// Common result type for MoodTunes operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the MoodTunes crates
#[derive(Error, Debug)]
pub enum Error {
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

    /// Authentication provider rejected the request.
    ///
    /// The message is user-presentable and is shown verbatim.
    #[error("{0}")]
    Auth(String),

    /// Billing collaborator failure (checkout, portal, subscription check)
    #[error("{0}")]
    Billing(String),

    /// Song search backend failure
    #[error("Lookup failed: {0}")]
    Lookup(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}
