use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::request::QueryParams;

/// A candidate returned by the external patient registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryPatient {
    /// Full name as stored by the registry
    pub pname: String,
    /// Birth date as formatted by the registry
    pub birthdate: String,
    /// Address
    #[serde(default)]
    pub address: Option<String>,
    /// Last known workplace
    #[serde(default)]
    pub lastworkplace: Option<String>,
    /// Position at the workplace
    #[serde(default)]
    pub position: Option<String>,
}

/// Name/birthdate/address fragments for a registry lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatientSearchParams {
    /// Last name fragment
    pub lastname: Option<String>,
    /// First name fragment
    pub firstname: Option<String>,
    /// Patronymic fragment
    pub secondname: Option<String>,
    /// Birth date
    pub birthdate: Option<String>,
    /// Address fragment
    pub address: Option<String>,
}

impl PatientSearchParams {
    /// Renders the non-empty fragments as query parameters.
    #[must_use]
    pub fn to_query(&self) -> QueryParams {
        QueryParams::new()
            .with("lastname", self.lastname.as_deref())
            .with("firstname", self.firstname.as_deref())
            .with("secondname", self.secondname.as_deref())
            .with("birthdate", self.birthdate.as_deref())
            .with("address", self.address.as_deref())
    }
}

/// Body of `POST /dates/suggest_discharge_date`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DischargeRequest {
    /// Admission date
    pub admission_date: NaiveDate,
    /// Tariff code that sets the expected stay
    pub cax_code_id: i64,
}

/// Response of `POST /dates/suggest_discharge_date`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DischargeSuggestion {
    /// Suggested discharge date
    pub discharge_date: NaiveDate,
}
