//! Verbs used by the records API.

use serde::{Deserialize, Serialize};
use std::fmt;

/// HTTP method of an [`ApiRequest`](super::ApiRequest).
///
/// Only the verbs the records API routes are modelled; `PATCH` is used for
/// activation toggles and partial updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// Reads and report downloads
    Get,
    /// Creation, login, refresh and job starts
    Post,
    /// Full updates
    Put,
    /// Partial updates and `toggle_active`
    Patch,
    /// Removal
    Delete,
}

impl HttpMethod {
    /// Wire name of the method.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_wire_name_matches_serialized_form() {
        for method in [
            HttpMethod::Get,
            HttpMethod::Post,
            HttpMethod::Put,
            HttpMethod::Patch,
            HttpMethod::Delete,
        ] {
            let json = serde_json::to_value(method).unwrap();
            assert_eq!(json, serde_json::json!(method.as_str()));
            assert_eq!(method.to_string(), method.as_str());
        }
    }

    #[test]
    fn test_toggle_uses_patch() {
        let method: HttpMethod = serde_json::from_str(r#""PATCH""#).unwrap();
        assert_eq!(method, HttpMethod::Patch);
        assert!(serde_json::from_str::<HttpMethod>(r#""HEAD""#).is_err());
    }
}
