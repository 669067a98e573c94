//! Medhist Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer, plus environment configuration.

pub mod adapters;
pub mod config;
pub mod persistence;
pub mod serialization;

pub use adapters::{
    DEFAULT_TIMEOUT, DownloadDirSink, ReqwestTransport, SystemClock, TracingNavigator,
    TracingNotifier,
};
pub use config::{ClientConfig, ConfigError};
pub use persistence::{FileSessionStore, InMemorySessionStore};
pub use serialization::{SerializationError, from_json_bytes, to_json_stable_bytes};
