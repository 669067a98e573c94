//! Remembered list filters.
//!
//! Filters survive between runs only within one session: a session id is
//! written on sign-in and saved filters are ignored without it.

use std::sync::Arc;

use medhist_domain::PersistedFilters;
use tracing::warn;

use crate::ports::{Clock, SessionStore, SessionStoreError};

/// Loads and saves the medical-history list filters.
#[derive(Clone)]
pub struct FilterSession {
    sessions: Arc<dyn SessionStore>,
    clock: Arc<dyn Clock>,
}

impl FilterSession {
    /// Creates the filter session.
    pub fn new(sessions: Arc<dyn SessionStore>, clock: Arc<dyn Clock>) -> Self {
        Self { sessions, clock }
    }

    /// Filters for a fresh session: no name, the current month.
    #[must_use]
    pub fn defaults(&self) -> PersistedFilters {
        PersistedFilters::for_month_of(self.clock.today())
    }

    /// Returns the saved filters, or the defaults when there is no session,
    /// nothing saved, or the saved blob is malformed.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the store cannot be read.
    pub async fn load(&self) -> Result<PersistedFilters, SessionStoreError> {
        if self.sessions.load_session_id().await?.is_none() {
            return Ok(self.defaults());
        }
        let Some(raw) = self.sessions.load_filters().await? else {
            return Ok(self.defaults());
        };
        Ok(PersistedFilters::parse(&raw).unwrap_or_else(|| {
            warn!("saved filters are malformed, using defaults");
            self.defaults()
        }))
    }

    /// Saves the filters.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the filters cannot be written.
    pub async fn save(&self, filters: &PersistedFilters) -> Result<(), SessionStoreError> {
        let raw = serde_json::to_value(filters)
            .map_err(|e| SessionStoreError::Serialization(e.to_string()))?;
        self.sessions.save_filters(&raw).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::testing::MemorySessions;
    use chrono::{DateTime, NaiveDate, TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    struct FixedClock;

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            Utc.with_ymd_and_hms(2024, 2, 14, 9, 30, 0).unwrap()
        }
    }

    fn session() -> (FilterSession, Arc<MemorySessions>) {
        let store = Arc::new(MemorySessions::default());
        (FilterSession::new(store.clone(), Arc::new(FixedClock)), store)
    }

    fn february() -> PersistedFilters {
        PersistedFilters {
            full_name: String::new(),
            start_date: "2024-02-01".to_string(),
            end_date: "2024-02-29".to_string(),
        }
    }

    #[tokio::test]
    async fn test_defaults_without_session() {
        let (filters, store) = session();
        store
            .save_filters(&json!({"fullName": "x", "startDate": "a", "endDate": "b"}))
            .await
            .unwrap();
        assert_eq!(filters.load().await.unwrap(), february());
        assert_eq!(
            filters.clock.today(),
            NaiveDate::from_ymd_opt(2024, 2, 14).unwrap()
        );
    }

    #[tokio::test]
    async fn test_saved_filters_within_session() {
        let (filters, store) = session();
        store.save_session_id("sid-1").await.unwrap();
        let saved = PersistedFilters {
            full_name: "Петров".to_string(),
            start_date: "2024-01-01".to_string(),
            end_date: "2024-01-31".to_string(),
        };
        filters.save(&saved).await.unwrap();
        assert_eq!(filters.load().await.unwrap(), saved);
    }

    #[tokio::test]
    async fn test_malformed_blob_falls_back() {
        let (filters, store) = session();
        store.save_session_id("sid-1").await.unwrap();
        store
            .save_filters(&json!({"fullName": 5, "startDate": "a"}))
            .await
            .unwrap();
        assert_eq!(filters.load().await.unwrap(), february());
    }
}
