//! HTTP transport port

use async_trait::async_trait;
use medhist_domain::{HttpMethod, RawResponse};
use thiserror::Error;

/// A fully-resolved request ready to go on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRequest {
    /// HTTP method
    pub method: HttpMethod,
    /// Absolute URL including the query string
    pub url: String,
    /// Headers to send
    pub headers: Vec<(String, String)>,
    /// Encoded body
    pub body: Option<Vec<u8>>,
}

impl PreparedRequest {
    /// Looks up a header by case-insensitive name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Errors raised below HTTP: the request never produced a response.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// Request timed out.
    #[error("Request timed out after {timeout_ms}ms")]
    Timeout {
        /// The timeout that elapsed
        timeout_ms: u64,
    },

    /// DNS resolution failed.
    #[error("Could not resolve host '{host}': {message}")]
    DnsError {
        /// Host that failed to resolve
        host: String,
        /// Underlying message
        message: String,
    },

    /// Connection was refused.
    #[error("Connection refused by {host}:{port}")]
    ConnectionRefused {
        /// Target host
        host: String,
        /// Target port
        port: u16,
    },

    /// Connection could not be established.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Redirect limit exceeded.
    #[error("Too many redirects (max {max})")]
    TooManyRedirects {
        /// The configured limit
        max: usize,
    },

    /// The response body could not be read.
    #[error("Failed to read response body: {0}")]
    Body(String),

    /// Any other transport failure.
    #[error("{0}")]
    Other(String),
}

/// Port for sending prepared requests.
///
/// Adapters only move bytes; status handling, auth headers and retries
/// live in the application layer.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Sends the request and returns whatever response came back,
    /// regardless of status.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` if no response was received.
    async fn send(&self, request: &PreparedRequest) -> Result<RawResponse, TransportError>;
}
