//! ID generation utilities.

use uuid::Uuid;

/// Generates a new random session identifier.
#[must_use]
pub fn generate_session_id() -> String {
    Uuid::new_v4().to_string()
}
