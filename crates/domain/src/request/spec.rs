//! API request specification type

use serde::{Deserialize, Serialize};

use super::{HttpMethod, QueryParams, RequestBody};
use crate::error::{DomainError, DomainResult};

/// How a successful response body should be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseMode {
    /// Parse the body as JSON
    #[default]
    Json,
    /// Keep the raw bytes
    Blob,
    /// Decode the body as UTF-8 text
    Text,
}

/// One logical call against the records API.
///
/// The path is relative to the configured base URL and must start with `/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiRequest {
    /// HTTP method
    pub method: HttpMethod,
    /// Path relative to the API origin
    pub path: String,
    /// Query parameters
    #[serde(default)]
    pub query: QueryParams,
    /// Request body
    #[serde(default)]
    pub body: RequestBody,
    /// Skip the `Authorization` header and the refresh-on-401 path
    #[serde(default)]
    pub no_auth: bool,
    /// Response decoding mode
    #[serde(default)]
    pub response: ResponseMode,
    /// Treat `202 Accepted` as a "not ready yet" error
    #[serde(default)]
    pub accepted_is_pending: bool,
}

impl ApiRequest {
    /// Creates a request with the given method and path.
    #[must_use]
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: QueryParams::new(),
            body: RequestBody::None,
            no_auth: false,
            response: ResponseMode::Json,
            accepted_is_pending: false,
        }
    }

    /// Creates a GET request.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    /// Creates a POST request.
    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    /// Creates a PUT request.
    #[must_use]
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, path)
    }

    /// Creates a PATCH request.
    #[must_use]
    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Patch, path)
    }

    /// Creates a DELETE request.
    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    /// Attaches a JSON body serialized from `value`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidBody` if the value cannot be serialized.
    pub fn json<T: Serialize + ?Sized>(mut self, value: &T) -> DomainResult<Self> {
        let value =
            serde_json::to_value(value).map_err(|e| DomainError::InvalidBody(e.to_string()))?;
        self.body = RequestBody::Json(value);
        Ok(self)
    }

    /// Attaches an already-built JSON body.
    #[must_use]
    pub fn json_value(mut self, value: serde_json::Value) -> Self {
        self.body = RequestBody::Json(value);
        self
    }

    /// Attaches a form-encoded body.
    #[must_use]
    pub fn form<K, V>(mut self, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.body = RequestBody::Form(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    /// Replaces the query parameters.
    #[must_use]
    pub fn query(mut self, query: QueryParams) -> Self {
        self.query = query;
        self
    }

    /// Adds a single query parameter; absent or empty values are dropped on send.
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: Option<impl Into<String>>) -> Self {
        self.query = self.query.with(key, value);
        self
    }

    /// Marks the request as unauthenticated.
    #[must_use]
    pub const fn no_auth(mut self) -> Self {
        self.no_auth = true;
        self
    }

    /// Requests the raw response bytes.
    #[must_use]
    pub const fn blob(mut self) -> Self {
        self.response = ResponseMode::Blob;
        self
    }

    /// Requests the response as text.
    #[must_use]
    pub const fn text(mut self) -> Self {
        self.response = ResponseMode::Text;
        self
    }

    /// Makes `202 Accepted` surface as an error instead of a success.
    #[must_use]
    pub const fn pending_on_accepted(mut self) -> Self {
        self.accepted_is_pending = true;
        self
    }

    /// Checks that the path is usable.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidPath` for empty or relative paths.
    pub fn validate(&self) -> DomainResult<()> {
        if !self.path.starts_with('/') {
            return Err(DomainError::InvalidPath(self.path.clone()));
        }
        if self.path.contains(['?', '#']) {
            return Err(DomainError::InvalidPath(format!(
                "{}: query belongs in the query parameters",
                self.path
            )));
        }
        Ok(())
    }
}
