//! Generic CRUD over one REST collection.

use std::marker::PhantomData;

use medhist_domain::entities::{
    Activatable, CaxCode, CaxCodeCreate, Operation, OperationCreate, Patient, PatientCreate,
    Personal, PersonalCreate, StaffKind,
};
use medhist_domain::{ApiRequest, ResponseBody};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::info;

use crate::client::ApiClient;
use crate::error::ApiError;

/// Outcome of [`Collection::delete_or_deactivate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Removal<R> {
    /// The record is gone.
    Deleted,
    /// The record is still referenced and was deactivated instead.
    Deactivated(R),
}

/// Typed access to a collection such as `/doctors`.
///
/// `R` is the record as read, `W` the create/update payload.
pub struct Collection<R, W> {
    client: ApiClient,
    path: String,
    _types: PhantomData<fn() -> (R, W)>,
}

impl<R, W> Clone for Collection<R, W> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            path: self.path.clone(),
            _types: PhantomData,
        }
    }
}

/// Doctors or nurses.
pub type StaffApi = Collection<Personal, PersonalCreate>;
/// Tariff codes.
pub type CaxCodeApi = Collection<CaxCode, CaxCodeCreate>;
/// Patients.
pub type PatientApi = Collection<Patient, PatientCreate>;
/// Operation protocols.
pub type OperationApi = Collection<Operation, OperationCreate>;

impl<R, W> Collection<R, W>
where
    R: DeserializeOwned,
    W: Serialize + Sync,
{
    /// Creates a handle for the collection at `path`.
    pub fn new(client: ApiClient, path: impl Into<String>) -> Self {
        Self {
            client,
            path: path.into(),
            _types: PhantomData,
        }
    }

    /// Returns the collection path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    fn item(&self, id: i64) -> String {
        format!("{}/{id}", self.path)
    }

    /// Lists every record.
    ///
    /// # Errors
    ///
    /// Returns the API error of the call.
    pub async fn list(&self) -> Result<Vec<R>, ApiError> {
        self.client.json(ApiRequest::get(self.path.as_str())).await
    }

    /// Fetches one record.
    ///
    /// # Errors
    ///
    /// Returns the API error of the call.
    pub async fn get(&self, id: i64) -> Result<R, ApiError> {
        self.client.json(ApiRequest::get(self.item(id))).await
    }

    /// Creates a record.
    ///
    /// # Errors
    ///
    /// Returns the API error of the call.
    pub async fn create(&self, payload: &W) -> Result<R, ApiError> {
        let request = ApiRequest::post(self.path.as_str()).json(payload)?;
        self.client.json(request).await
    }

    /// Replaces a record.
    ///
    /// # Errors
    ///
    /// Returns the API error of the call.
    pub async fn update(&self, id: i64, payload: &W) -> Result<R, ApiError> {
        let request = ApiRequest::put(self.item(id)).json(payload)?;
        self.client.json(request).await
    }

    /// Deletes a record.
    ///
    /// # Errors
    ///
    /// Returns the API error of the call.
    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.client.empty(ApiRequest::delete(self.item(id))).await
    }

    /// Flips the record's active flag.
    ///
    /// # Errors
    ///
    /// Returns the API error of the call.
    pub async fn toggle_active(&self, id: i64) -> Result<R, ApiError> {
        self.client
            .json(ApiRequest::patch(format!("{}/toggle_active", self.item(id))))
            .await
    }
}

impl<R, W> Collection<R, W>
where
    R: DeserializeOwned + Activatable,
    W: Serialize + Sync,
{
    /// Deletes a record, accepting that the server may keep a referenced
    /// record and deactivate it instead.
    ///
    /// The server signals this either by returning the record inactive or
    /// by rejecting the delete with 400/409. After a rejection the record is
    /// re-read and toggled off if it is still active.
    ///
    /// # Errors
    ///
    /// Returns any other API error.
    pub async fn delete_or_deactivate(&self, id: i64) -> Result<Removal<R>, ApiError> {
        match self.client.execute(&ApiRequest::delete(self.item(id))).await {
            Ok(ResponseBody::Json(value)) => match serde_json::from_value::<R>(value) {
                Ok(record) if !record.is_active() => Ok(Removal::Deactivated(record)),
                _ => Ok(Removal::Deleted),
            },
            Ok(_) => Ok(Removal::Deleted),
            Err(err) if err.is_conflict() => {
                info!(path = %self.path, id, reason = %err.message(), "delete refused, deactivating");
                let record = self.get(id).await?;
                if record.is_active() {
                    return self.toggle_active(id).await.map(Removal::Deactivated);
                }
                Ok(Removal::Deactivated(record))
            }
            Err(err) => Err(err),
        }
    }
}

impl StaffApi {
    /// Doctors or nurses, depending on `kind`.
    #[must_use]
    pub fn staff(client: ApiClient, kind: StaffKind) -> Self {
        Self::new(client, kind.path())
    }
}

impl CaxCodeApi {
    /// The `/cax_codes` collection.
    #[must_use]
    pub fn cax_codes(client: ApiClient) -> Self {
        Self::new(client, "/cax_codes")
    }
}

impl PatientApi {
    /// The `/patients` collection.
    #[must_use]
    pub fn patients(client: ApiClient) -> Self {
        Self::new(client, "/patients")
    }
}

impl OperationApi {
    /// The `/operations` collection.
    #[must_use]
    pub fn operations(client: ApiClient) -> Self {
        Self::new(client, "/operations")
    }

    /// Operations recorded for one medical history.
    ///
    /// # Errors
    ///
    /// Returns the API error of the call.
    pub async fn list_for_history(&self, history_id: i64) -> Result<Vec<Operation>, ApiError> {
        let mut operations = self.list().await?;
        operations.retain(|op| op.medical_history_id == history_id);
        Ok(operations)
    }
}
