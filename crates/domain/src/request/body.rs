//! HTTP request body types

use serde::{Deserialize, Serialize};

/// Content type for JSON bodies.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Content type for form-encoded bodies.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Body of an API request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "type", content = "content", rename_all = "snake_case")]
pub enum RequestBody {
    /// No body
    #[default]
    None,
    /// A JSON document
    Json(serde_json::Value),
    /// Form URL encoded key/value pairs
    Form(Vec<(String, String)>),
}

impl RequestBody {
    /// Returns whether there is nothing to send.
    #[must_use]
    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Returns the content type if applicable.
    #[must_use]
    pub const fn content_type(&self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Json(_) => Some(JSON_CONTENT_TYPE),
            Self::Form(_) => Some(FORM_CONTENT_TYPE),
        }
    }
}
