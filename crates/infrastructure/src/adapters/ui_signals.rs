//! Console renderings of UI signals.
//!
//! Toasts and redirects have no screen in the CLI; they become log events.

use medhist_application::ports::{Navigator, Notifier};
use parking_lot::Mutex;
use tracing::{debug, error, info};

/// Notifier that logs every signal.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn loading(&self, id: &str, message: &str) {
        info!(correlation_id = id, "{message}");
    }

    fn success(&self, id: &str, message: &str) {
        info!(correlation_id = id, "{message}");
    }

    fn error(&self, id: &str, message: &str) {
        error!(correlation_id = id, "{message}");
    }

    fn dismiss(&self, id: &str) {
        debug!(correlation_id = id, "notification dismissed");
    }
}

/// Navigator that logs redirects and remembers the last one.
#[derive(Debug, Default)]
pub struct TracingNavigator {
    last: Mutex<Option<String>>,
}

impl TracingNavigator {
    /// Creates the navigator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the most recent route requested, if any.
    #[must_use]
    pub fn last_route(&self) -> Option<String> {
        self.last.lock().clone()
    }
}

impl Navigator for TracingNavigator {
    fn navigate(&self, route: &str) {
        info!(route, "session ended, sign in again");
        *self.last.lock() = Some(route.to_string());
    }
}
