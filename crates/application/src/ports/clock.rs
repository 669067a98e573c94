//! Clock port for time-related operations

use chrono::{DateTime, NaiveDate, Utc};

/// Port for getting the current time.
///
/// This abstraction allows testing date-dependent defaults by providing
/// a fixed implementation.
pub trait Clock: Send + Sync {
    /// Returns the current UTC timestamp.
    fn now(&self) -> DateTime<Utc>;

    /// Returns the current calendar date.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}
