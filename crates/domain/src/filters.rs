//! Saved list filters for the medical-history view.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::date::month_bounds;
use crate::entities::MedicalHistoryFilters;

/// Filter values remembered between runs within one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedFilters {
    /// Patient name fragment
    pub full_name: String,
    /// Admission date lower bound, ISO
    pub start_date: String,
    /// Admission date upper bound, ISO
    pub end_date: String,
}

impl PersistedFilters {
    /// Defaults: empty name, the month containing `today`.
    #[must_use]
    pub fn for_month_of(today: NaiveDate) -> Self {
        let (first, last) = month_bounds(today);
        Self {
            full_name: String::new(),
            start_date: first.format("%Y-%m-%d").to_string(),
            end_date: last.format("%Y-%m-%d").to_string(),
        }
    }

    /// Parses a saved blob; returns `None` if it is malformed.
    #[must_use]
    pub fn parse(raw: &serde_json::Value) -> Option<Self> {
        serde_json::from_value(raw.clone()).ok()
    }

    /// Converts the saved values into request filters.
    #[must_use]
    pub fn to_request_filters(&self) -> MedicalHistoryFilters {
        let non_blank = |s: &str| {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        };
        MedicalHistoryFilters {
            full_name: non_blank(&self.full_name),
            start_date: non_blank(&self.start_date),
            end_date: non_blank(&self.end_date),
        }
    }
}
