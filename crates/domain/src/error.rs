//! Domain error types

use thiserror::Error;

/// Domain-level errors that can occur during validation or processing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The request path is not an absolute API path.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// A date could not be parsed.
    #[error("invalid date: {0}")]
    InvalidDate(String),

    /// The request body could not be serialized.
    #[error("invalid body: {0}")]
    InvalidBody(String),
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
