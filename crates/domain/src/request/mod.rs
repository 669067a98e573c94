//! HTTP request domain types

mod body;
mod method;
mod query;
mod spec;

pub use body::{FORM_CONTENT_TYPE, JSON_CONTENT_TYPE, RequestBody};
pub use method::HttpMethod;
pub use query::{QueryParam, QueryParams};
pub use spec::{ApiRequest, ResponseMode};
