//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the application core and external systems.
//! Each port is a trait that can be implemented by adapters in the infrastructure layer.

mod clock;
mod file_sink;
mod navigator;
mod notifier;
mod session_store;
mod transport;

pub use clock::Clock;
pub use file_sink::{FileSink, FileSinkError};
pub use navigator::{LOGIN_ROUTE, Navigator};
pub use notifier::Notifier;
pub use session_store::{SessionStore, SessionStoreError};
pub use transport::{HttpTransport, PreparedRequest, TransportError};
