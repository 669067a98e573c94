//! Medhist Domain - Core types
//!
//! This crate defines the data model shared by the medical-records API
//! client: request/response specifications, credentials, records and
//! report jobs. All types here are pure Rust with no I/O dependencies.

pub mod auth;
pub mod date;
pub mod entities;
pub mod error;
pub mod filters;
pub mod id;
pub mod report;
pub mod request;
pub mod response;

pub use auth::{Credentials, Role, TokenPair, TokenResponse, UserRead};
pub use error::{DomainError, DomainResult};
pub use filters::PersistedFilters;
pub use id::generate_session_id;
pub use report::{ReportKind, ReportTask, TaskState, TaskStatus};
pub use request::{ApiRequest, HttpMethod, QueryParams, RequestBody, ResponseMode};
pub use response::{RawResponse, ResponseBody};
