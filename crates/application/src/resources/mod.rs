//! Typed APIs for the records managed by the console.

mod collection;
mod medical_history;
mod registry;

pub use collection::{CaxCodeApi, Collection, OperationApi, PatientApi, Removal, StaffApi};
pub use medical_history::MedicalHistoryApi;
pub use registry::{DatesApi, PatientSearch, RegistryApi};
