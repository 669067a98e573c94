use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A patient known to the records system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
    /// Record id
    pub id: i64,
    /// Full name
    pub full_name: String,
    /// Date of birth
    pub birth_date: NaiveDate,
    /// Home address
    pub address: String,
    /// Place of work
    #[serde(default)]
    pub workplace: Option<String>,
    /// Soft activation flag
    #[serde(default = "active_by_default")]
    pub is_active: bool,
    /// Creation timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Last update timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

const fn active_by_default() -> bool {
    true
}

/// Payload for creating or updating a patient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientCreate {
    /// Full name
    pub full_name: String,
    /// Date of birth
    pub birth_date: NaiveDate,
    /// Home address
    pub address: String,
    /// Place of work
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workplace: Option<String>,
}
