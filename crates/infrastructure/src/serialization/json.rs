//! Stable JSON encoding helpers.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::ser::{PrettyFormatter, Serializer};

/// Error type for serialization operations.
#[derive(Debug, thiserror::Error)]
pub enum SerializationError {
    /// Encoding failed.
    #[error("JSON serialization failed: {0}")]
    Serialize(#[source] serde_json::Error),

    /// Decoding failed.
    #[error("JSON deserialization failed: {0}")]
    Deserialize(#[source] serde_json::Error),
}

/// Encodes `value` as indented JSON bytes ending in a newline.
///
/// # Errors
///
/// Returns an error if the value cannot be serialized.
pub fn to_json_stable_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, SerializationError> {
    let mut buffer = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(b"  "));
    value
        .serialize(&mut serializer)
        .map_err(SerializationError::Serialize)?;
    buffer.push(b'\n');
    Ok(buffer)
}

/// Decodes JSON bytes, pretty-printed or not.
///
/// # Errors
///
/// Returns an error if the JSON is invalid or has the wrong shape.
pub fn from_json_bytes<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, SerializationError> {
    serde_json::from_slice(bytes).map_err(SerializationError::Deserialize)
}
