//! Infrastructure adapters

mod download_sink;
mod reqwest_transport;
mod system_clock;
mod ui_signals;

pub use download_sink::DownloadDirSink;
pub use reqwest_transport::{DEFAULT_TIMEOUT, ReqwestTransport};
pub use system_clock::SystemClock;
pub use ui_signals::{TracingNavigator, TracingNotifier};
