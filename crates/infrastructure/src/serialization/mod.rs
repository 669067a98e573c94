//! JSON encoding of files written by the client.
//!
//! Output is pretty-printed with two-space indentation and a trailing
//! newline so a session file can be inspected by hand.

mod json;

pub use json::{SerializationError, from_json_bytes, to_json_stable_bytes};
