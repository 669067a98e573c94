//! External patient registry lookup and date suggestions.

use medhist_domain::ApiRequest;
use medhist_domain::entities::{
    DischargeRequest, DischargeSuggestion, PatientSearchParams, RegistryPatient,
};
use serde::Deserialize;

use crate::client::ApiClient;
use crate::error::ApiError;

const PATIENT_SEARCH_PATH: &str = "/oracle/patient-search";
const SUGGEST_DISCHARGE_PATH: &str = "/dates/suggest_discharge_date";

/// Result of a registry search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatientSearch {
    /// Matching candidates, possibly none
    Found(Vec<RegistryPatient>),
    /// The registry refused the query
    Rejected(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SearchPayload {
    Found(Vec<RegistryPatient>),
    Rejected { error: String },
}

impl From<SearchPayload> for PatientSearch {
    fn from(payload: SearchPayload) -> Self {
        match payload {
            SearchPayload::Found(patients) => Self::Found(patients),
            SearchPayload::Rejected { error } => Self::Rejected(error),
        }
    }
}

/// Lookup in the hospital's external patient registry.
#[derive(Clone)]
pub struct RegistryApi {
    client: ApiClient,
}

impl RegistryApi {
    /// Creates the API handle.
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Searches the registry by name, birth date and address fragments.
    ///
    /// # Errors
    ///
    /// Returns the API error of the call.
    pub async fn search_patients(
        &self,
        params: &PatientSearchParams,
    ) -> Result<PatientSearch, ApiError> {
        let request = ApiRequest::get(PATIENT_SEARCH_PATH).query(params.to_query());
        let payload: SearchPayload = self.client.json(request).await?;
        Ok(payload.into())
    }
}

/// Server-side date arithmetic.
#[derive(Clone)]
pub struct DatesApi {
    client: ApiClient,
}

impl DatesApi {
    /// Creates the API handle.
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Suggests a discharge date from the admission date and tariff code.
    ///
    /// # Errors
    ///
    /// Returns the API error of the call.
    pub async fn suggest_discharge_date(
        &self,
        request: &DischargeRequest,
    ) -> Result<DischargeSuggestion, ApiError> {
        let request = ApiRequest::post(SUGGEST_DISCHARGE_PATH).json(request)?;
        self.client.json(request).await
    }
}
