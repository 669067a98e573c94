//! Medical history records.

use medhist_domain::ApiRequest;
use medhist_domain::entities::{
    MedicalHistoryCreate, MedicalHistoryFilters, MedicalHistoryRead, MedicalHistoryUpdate,
};

use crate::client::ApiClient;
use crate::error::ApiError;

const HISTORY_PATH: &str = "/medical_history";

/// Typed access to `/medical_history`.
#[derive(Clone)]
pub struct MedicalHistoryApi {
    client: ApiClient,
}

impl MedicalHistoryApi {
    /// Creates the API handle.
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Lists histories matching `filters`; blank filters are not sent.
    ///
    /// # Errors
    ///
    /// Returns the API error of the call.
    pub async fn list(
        &self,
        filters: &MedicalHistoryFilters,
    ) -> Result<Vec<MedicalHistoryRead>, ApiError> {
        let request = ApiRequest::get(HISTORY_PATH).query(filters.to_query());
        self.client.json(request).await
    }

    /// Fetches one history.
    ///
    /// # Errors
    ///
    /// Returns the API error of the call.
    pub async fn get(&self, id: i64) -> Result<MedicalHistoryRead, ApiError> {
        self.client
            .json(ApiRequest::get(format!("{HISTORY_PATH}/{id}")))
            .await
    }

    /// Opens a new history.
    ///
    /// # Errors
    ///
    /// Returns the API error of the call.
    pub async fn create(
        &self,
        payload: &MedicalHistoryCreate,
    ) -> Result<MedicalHistoryRead, ApiError> {
        let request = ApiRequest::post(HISTORY_PATH).json(payload)?;
        self.client.json(request).await
    }

    /// Replaces a history.
    ///
    /// # Errors
    ///
    /// Returns the API error of the call.
    pub async fn update(
        &self,
        id: i64,
        payload: &MedicalHistoryUpdate,
    ) -> Result<MedicalHistoryRead, ApiError> {
        let request = ApiRequest::put(format!("{HISTORY_PATH}/{id}")).json(payload)?;
        self.client.json(request).await
    }

    /// Marks a history as cancelled.
    ///
    /// # Errors
    ///
    /// Returns the API error of the call.
    pub async fn cancel(&self, id: i64) -> Result<(), ApiError> {
        self.client
            .empty(ApiRequest::post(format!("{HISTORY_PATH}/{id}/cancel")))
            .await
    }

    /// Undoes a cancellation.
    ///
    /// # Errors
    ///
    /// Returns the API error of the call.
    pub async fn reactivate(&self, id: i64) -> Result<(), ApiError> {
        self.client
            .empty(ApiRequest::post(format!("{HISTORY_PATH}/{id}/reactivate")))
            .await
    }
}
