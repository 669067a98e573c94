//! Asynchronous report generation and export.

mod export;
mod poller;

pub use export::{EXPORT_PATH, export_status_path};
pub use poller::{DEFAULT_MAX_ATTEMPTS, DEFAULT_POLL_INTERVAL, PollPolicy, ReportPoller};
