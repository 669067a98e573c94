//! System clock adapter

use chrono::{DateTime, Local, NaiveDate, Utc};
use medhist_application::ports::Clock;

/// Clock backed by the operating system.
///
/// Calendar dates follow the local time zone, so "this month" matches the
/// wall calendar of the person at the console.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    /// Creates a new system clock.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}
