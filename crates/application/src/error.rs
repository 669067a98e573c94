//! Application error types

use medhist_domain::DomainError;
use thiserror::Error;

use crate::ports::{FileSinkError, SessionStoreError, TransportError};

/// HTTP status the report endpoints use for "job still running".
pub const NOT_READY_STATUS: u16 = 202;

/// Status of an expired or missing access token.
pub const UNAUTHORIZED_STATUS: u16 = 401;

/// Error raised by a single API call.
///
/// Cloneable so that the outcome of one token refresh can be handed to
/// every request that was waiting on it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// No response was received.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The server answered with an error status.
    #[error("{message} (HTTP {status})")]
    Status {
        /// HTTP status code
        status: u16,
        /// Human-readable message: the `detail` field, raw body, or a
        /// generic placeholder, in that order
        message: String,
        /// The `detail` value of a structured error body
        detail: Option<serde_json::Value>,
    },

    /// A successful response did not have the expected shape.
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// The request could not be built.
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] DomainError),
}

impl ApiError {
    /// Creates a status error without structured detail.
    #[must_use]
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: message.into(),
            detail: None,
        }
    }

    /// Error handed to waiters whose refresh was abandoned mid-flight.
    #[must_use]
    pub fn refresh_aborted() -> Self {
        Self::Transport(TransportError::Other(
            "token refresh was aborted".to_string(),
        ))
    }

    /// Returns the HTTP status, if the server answered.
    #[must_use]
    pub const fn http_status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the user-facing message without the status suffix.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Status { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// Returns the structured `detail`, if any.
    #[must_use]
    pub const fn detail(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Status { detail, .. } => detail.as_ref(),
            _ => None,
        }
    }

    /// Returns true for 401 responses.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self.http_status(), Some(UNAUTHORIZED_STATUS))
    }

    /// Returns true for the "still processing" signal of report jobs.
    #[must_use]
    pub const fn is_not_ready(&self) -> bool {
        matches!(self.http_status(), Some(NOT_READY_STATUS))
    }

    /// Returns true when the backend rejected the call on a business rule,
    /// e.g. a delete blocked by references.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self.http_status(), Some(400 | 409))
    }
}

/// Errors of multi-step flows: login, polling, filter persistence.
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// An API call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Persisted session state could not be read or written.
    #[error("session storage error: {0}")]
    Session(#[from] SessionStoreError),

    /// A downloaded document could not be saved.
    #[error("download failed: {0}")]
    Download(#[from] FileSinkError),

    /// A domain validation error occurred.
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),

    /// The server reported that a report job failed.
    #[error("report generation failed: {0}")]
    ReportFailed(String),

    /// Polling stopped before the job finished.
    #[error("report not ready after {attempts} checks")]
    PollExhausted {
        /// Number of checks performed
        attempts: u32,
    },
}

impl ApplicationError {
    /// Returns the underlying API error, if that is what failed.
    #[must_use]
    pub const fn as_api(&self) -> Option<&ApiError> {
        match self {
            Self::Api(e) => Some(e),
            _ => None,
        }
    }
}

/// Result type alias for application operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
