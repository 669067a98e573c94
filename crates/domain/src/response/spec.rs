//! Response types

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// An HTTP response as returned by the transport, before decoding.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RawResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers, lower-cased names
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// Response body bytes
    #[serde(default)]
    pub body: Vec<u8>,
}

impl RawResponse {
    /// Creates a response with the given status and body.
    #[must_use]
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: BTreeMap::new(),
            body: body.into(),
        }
    }

    /// Creates a response carrying a JSON document.
    #[must_use]
    pub fn json(status: u16, value: &serde_json::Value) -> Self {
        let mut response = Self::new(status, value.to_string());
        response
            .headers
            .insert("content-type".to_string(), "application/json".to_string());
        response
    }

    /// Returns true if the status code indicates success (2xx).
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Returns true for statuses that never carry a body (204, 205).
    #[must_use]
    pub const fn is_empty_status(&self) -> bool {
        matches!(self.status, 204 | 205)
    }

    /// Returns true if the status code indicates a client error (4xx).
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        self.status >= 400 && self.status < 500
    }

    /// Returns true if the status code indicates a server error (5xx).
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        self.status >= 500 && self.status < 600
    }

    /// Looks up a header by case-insensitive name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

/// A decoded successful response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseBody {
    /// 204/205, or an empty body
    Empty,
    /// Parsed JSON document
    Json(serde_json::Value),
    /// Raw bytes
    Blob(Vec<u8>),
    /// UTF-8 text
    Text(String),
}

impl ResponseBody {
    /// Returns the JSON value, treating an empty body as `null`.
    #[must_use]
    pub fn into_json(self) -> serde_json::Value {
        match self {
            Self::Json(value) => value,
            Self::Text(text) => serde_json::Value::String(text),
            Self::Empty | Self::Blob(_) => serde_json::Value::Null,
        }
    }

    /// Returns the raw bytes of the body.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Self::Empty => Vec::new(),
            Self::Json(value) => value.to_string().into_bytes(),
            Self::Blob(bytes) => bytes,
            Self::Text(text) => text.into_bytes(),
        }
    }

    /// Returns true if nothing was returned.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_checks() {
        assert!(RawResponse::new(200, "").is_success());
        assert!(RawResponse::new(204, "").is_empty_status());
        assert!(RawResponse::new(401, "").is_client_error());
        assert!(RawResponse::new(502, "").is_server_error());
        assert!(!RawResponse::new(202, "").is_empty_status());
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let response = RawResponse::json(200, &serde_json::json!({}));
        assert_eq!(response.header("Content-Type"), Some("application/json"));
    }

    #[test]
    fn test_body_conversions() {
        assert_eq!(ResponseBody::Empty.into_json(), serde_json::Value::Null);
        assert_eq!(ResponseBody::Blob(vec![1, 2]).into_bytes(), vec![1, 2]);
    }
}
