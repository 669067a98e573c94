use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{CaxCode, Patient, Personal};
use crate::request::QueryParams;

/// Payload for opening a medical history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicalHistoryCreate {
    /// Admission date
    pub admission_date: NaiveDate,
    /// Discharge date, if already known
    #[serde(default)]
    pub discharge_date: Option<NaiveDate>,
    /// Patient full name
    pub full_name: String,
    /// Patient date of birth
    pub birth_date: NaiveDate,
    /// Patient address
    pub address: String,
    /// Patient workplace
    #[serde(default)]
    pub workplace: Option<String>,
    /// Clinical diagnosis
    pub diagnosis: String,
    /// ICD-10 code
    pub icd10_code: String,
    /// Tariff code id
    pub cax_code_id: i64,
    /// Attending doctor id
    pub doctor_id: i64,
    /// Attending nurse id
    pub nurse_id: i64,
}

/// `PUT /medical_history/{id}` takes the same shape as creation.
pub type MedicalHistoryUpdate = MedicalHistoryCreate;

/// A medical history as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicalHistoryRead {
    /// Record id
    pub id: i64,
    /// Sequential history number
    pub history_number: i64,
    /// Admission date
    pub admission_date: NaiveDate,
    /// Discharge date
    #[serde(default)]
    pub discharge_date: Option<NaiveDate>,
    /// Clinical diagnosis
    pub diagnosis: String,
    /// ICD-10 code
    pub icd10_code: String,
    /// Cancellation marker; `Some` when the history was cancelled
    #[serde(default)]
    pub cancelled: Option<String>,
    /// Creation timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Last update timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    /// Patient
    pub patient: Patient,
    /// Attending doctor
    pub doctor: Personal,
    /// Attending nurse
    pub nurse: Personal,
    /// Tariff code
    pub cax_code: CaxCode,
}

impl MedicalHistoryRead {
    /// Returns true if the history has been cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.as_deref().is_some_and(|c| !c.is_empty())
    }

    /// Default file name for the rendered history document.
    #[must_use]
    pub fn report_filename(&self) -> String {
        format!("История_болезни_{}.docx", self.history_number)
    }
}

/// Filters for listing and exporting medical histories.
///
/// Values are sent as typed by the user, trimmed; blank values are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicalHistoryFilters {
    /// Patient name fragment
    #[serde(default)]
    pub full_name: Option<String>,
    /// Admission date lower bound
    #[serde(default)]
    pub start_date: Option<String>,
    /// Admission date upper bound
    #[serde(default)]
    pub end_date: Option<String>,
}

impl MedicalHistoryFilters {
    /// Renders the filters as query parameters.
    #[must_use]
    pub fn to_query(&self) -> QueryParams {
        QueryParams::new()
            .with("full_name", self.full_name.as_deref().map(str::trim))
            .with("start_date", self.start_date.as_deref().map(str::trim))
            .with("end_date", self.end_date.as_deref().map(str::trim))
    }
}
