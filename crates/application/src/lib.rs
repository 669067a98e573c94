//! Medhist Application - Session and request orchestration
//!
//! This crate implements the client core of the medical-records console:
//! - Port definitions for transport, persistence and UI signals
//! - Request execution with bearer authentication
//! - Single-flight token refresh with request replay
//! - Report polling and typed resource APIs

pub mod auth;
pub mod client;
pub mod error;
pub mod executor;
pub mod filters;
pub mod ports;
pub mod report;
pub mod resources;

#[cfg(test)]
mod testing;

pub use auth::{AuthService, Recovery, RefreshCoordinator, TokenStore};
pub use client::{ApiClient, ApiClientBuilder};
pub use error::{ApiError, ApplicationError, ApplicationResult};
pub use executor::RequestExecutor;
pub use filters::FilterSession;
pub use report::{PollPolicy, ReportPoller};
pub use resources::{
    CaxCodeApi, Collection, DatesApi, MedicalHistoryApi, OperationApi, PatientApi, PatientSearch,
    RegistryApi, Removal, StaffApi,
};
