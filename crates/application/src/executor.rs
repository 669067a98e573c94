//! Request executor
//!
//! Turns one [`ApiRequest`] into one HTTP exchange: URL and query
//! rendering, body encoding, the `Content-Type`/`Authorization` headers,
//! and translation of error statuses into [`ApiError`]. It never retries;
//! recovering from an expired token is the client's job.

use std::sync::Arc;

use medhist_domain::{
    ApiRequest, RawResponse, RequestBody, ResponseBody, ResponseMode, auth::bearer,
};
use tracing::debug;

use crate::error::{ApiError, NOT_READY_STATUS};
use crate::ports::{HttpTransport, PreparedRequest};

/// Message used when an error response has no readable body.
const UNREADABLE_BODY: &str = "response body unreadable";

/// Message used when a pending job answers 202 without a body.
const NOT_READY_MESSAGE: &str = "result is not ready yet";

/// Sends single requests against a fixed API origin.
#[derive(Clone)]
pub struct RequestExecutor {
    base_url: String,
    transport: Arc<dyn HttpTransport>,
}

impl RequestExecutor {
    /// Creates an executor for the given origin.
    ///
    /// A trailing `/` on `base_url` is ignored.
    pub fn new(base_url: impl Into<String>, transport: Arc<dyn HttpTransport>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            transport,
        }
    }

    /// Returns the API origin.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds the wire request.
    ///
    /// `access_token` is attached as a bearer credential unless the request
    /// is flagged `no_auth`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidRequest` if the path is invalid or the body
    /// cannot be encoded.
    pub fn prepare(
        &self,
        request: &ApiRequest,
        access_token: Option<&str>,
    ) -> Result<PreparedRequest, ApiError> {
        request.validate()?;

        let mut url = format!("{}{}", self.base_url, request.path);
        if !request.query.is_empty() {
            let pairs: Vec<(&str, &str)> = request.query.present().collect();
            let encoded = serde_urlencoded::to_string(&pairs).map_err(|e| {
                ApiError::InvalidRequest(medhist_domain::DomainError::InvalidBody(e.to_string()))
            })?;
            url.push('?');
            url.push_str(&encoded);
        }

        let mut headers = Vec::new();
        if let Some(content_type) = request.body.content_type() {
            headers.push(("Content-Type".to_string(), content_type.to_string()));
        }
        if !request.no_auth
            && let Some(token) = access_token.filter(|t| !t.is_empty())
        {
            headers.push(("Authorization".to_string(), bearer(token)));
        }

        let body = match &request.body {
            RequestBody::None => None,
            RequestBody::Json(value) => Some(value.to_string().into_bytes()),
            RequestBody::Form(pairs) => {
                let encoded = serde_urlencoded::to_string(pairs).map_err(|e| {
                    ApiError::InvalidRequest(medhist_domain::DomainError::InvalidBody(
                        e.to_string(),
                    ))
                })?;
                Some(encoded.into_bytes())
            }
        };

        Ok(PreparedRequest {
            method: request.method,
            url,
            headers,
            body,
        })
    }

    /// Sends the request and returns the raw response of a successful call.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Transport` if nothing came back and
    /// `ApiError::Status` for non-2xx responses (and for 202 when the request
    /// opted into `pending_on_accepted`).
    pub async fn send(
        &self,
        request: &ApiRequest,
        access_token: Option<&str>,
    ) -> Result<RawResponse, ApiError> {
        let prepared = self.prepare(request, access_token)?;
        debug!(method = %prepared.method, path = %request.path, "sending request");

        let response = self.transport.send(&prepared).await?;
        debug!(path = %request.path, status = response.status, "received response");

        if request.accepted_is_pending && response.status == NOT_READY_STATUS {
            return Err(not_ready_from_response(&response));
        }
        if !response.is_success() {
            return Err(error_from_response(&response));
        }
        Ok(response)
    }

    /// Sends the request and decodes the body per its response mode.
    ///
    /// # Errors
    ///
    /// See [`RequestExecutor::send`]; additionally `ApiError::Decode` when a
    /// JSON body does not parse.
    pub async fn execute(
        &self,
        request: &ApiRequest,
        access_token: Option<&str>,
    ) -> Result<ResponseBody, ApiError> {
        let response = self.send(request, access_token).await?;
        decode(response, request.response)
    }
}

/// Decodes a successful response.
///
/// # Errors
///
/// Returns `ApiError::Decode` if JSON mode is requested and the body is not JSON.
pub fn decode(response: RawResponse, mode: ResponseMode) -> Result<ResponseBody, ApiError> {
    if response.is_empty_status() {
        return Ok(ResponseBody::Empty);
    }
    match mode {
        ResponseMode::Blob => Ok(ResponseBody::Blob(response.body)),
        ResponseMode::Text => Ok(ResponseBody::Text(
            String::from_utf8_lossy(&response.body).into_owned(),
        )),
        ResponseMode::Json => {
            if response.body.iter().all(u8::is_ascii_whitespace) {
                return Ok(ResponseBody::Empty);
            }
            serde_json::from_slice(&response.body)
                .map(ResponseBody::Json)
                .map_err(|e| ApiError::Decode(e.to_string()))
        }
    }
}

/// Builds the error for a non-2xx response.
///
/// The message is the `detail` of a JSON error body when present, else the
/// raw body text, else a generic placeholder. The status is always kept.
#[must_use]
pub fn error_from_response(response: &RawResponse) -> ApiError {
    parse_error_body(response).unwrap_or_else(|| {
        ApiError::status(
            response.status,
            format!("HTTP {}: {UNREADABLE_BODY}", response.status),
        )
    })
}

fn not_ready_from_response(response: &RawResponse) -> ApiError {
    parse_error_body(response)
        .unwrap_or_else(|| ApiError::status(response.status, NOT_READY_MESSAGE))
}

fn parse_error_body(response: &RawResponse) -> Option<ApiError> {
    let text = std::str::from_utf8(&response.body).ok()?;
    if text.trim().is_empty() {
        return None;
    }

    if let Ok(serde_json::Value::Object(map)) = serde_json::from_str(text)
        && let Some(detail) = map.get("detail").filter(|d| !d.is_null())
    {
        let message = match detail {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        return Some(ApiError::Status {
            status: response.status,
            message,
            detail: Some(detail.clone()),
        });
    }

    Some(ApiError::status(response.status, text.trim()))
}
