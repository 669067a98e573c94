//! Query parameter types

use serde::{Deserialize, Serialize};

/// A query parameter whose value may be absent.
///
/// Absent and empty values are dropped when the query string is rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryParam {
    /// The parameter key
    pub key: String,
    /// The parameter value, if any
    pub value: Option<String>,
}

impl QueryParam {
    /// Creates a parameter with a value.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: Some(value.into()),
        }
    }

    /// Creates a parameter from an optional value.
    #[must_use]
    pub fn optional(key: impl Into<String>, value: Option<impl Into<String>>) -> Self {
        Self {
            key: key.into(),
            value: value.map(Into::into),
        }
    }

    /// Returns true if this parameter is sent on the wire.
    #[must_use]
    pub fn is_present(&self) -> bool {
        self.value.as_deref().is_some_and(|v| !v.is_empty())
    }
}

/// An ordered collection of query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryParams {
    items: Vec<QueryParam>,
}

impl QueryParams {
    /// Creates an empty query parameter collection.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Adds a query parameter to the collection.
    pub fn add(&mut self, param: QueryParam) {
        self.items.push(param);
    }

    /// Builder-style insert of an optional value.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: Option<impl Into<String>>) -> Self {
        self.add(QueryParam::optional(key, value));
        self
    }

    /// Returns the `(key, value)` pairs that are actually sent.
    pub fn present(&self) -> impl Iterator<Item = (&str, &str)> {
        self.items.iter().filter_map(|p| match p.value.as_deref() {
            Some(v) if !v.is_empty() => Some((p.key.as_str(), v)),
            _ => None,
        })
    }

    /// Returns true if no parameter would be sent.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.present().next().is_none()
    }
}

impl FromIterator<QueryParam> for QueryParams {
    fn from_iter<T: IntoIterator<Item = QueryParam>>(iter: T) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}
