//! Records managed through the API: staff, tariff codes, patients,
//! operations and medical histories.

mod cax_code;
mod medical_history;
mod operation;
mod patient;
mod personal;
mod registry;

pub use cax_code::{CaxCode, CaxCodeCreate};
pub use medical_history::{
    MedicalHistoryCreate, MedicalHistoryFilters, MedicalHistoryRead, MedicalHistoryUpdate,
};
pub use operation::{Operation, OperationCreate};
pub use patient::{Patient, PatientCreate};
pub use personal::{Personal, PersonalCreate, StaffKind};
pub use registry::{
    DischargeRequest, DischargeSuggestion, PatientSearchParams, RegistryPatient,
};

/// Records the API can deactivate instead of deleting.
pub trait Activatable {
    /// Returns true while the record is active.
    fn is_active(&self) -> bool;
}

impl Activatable for Personal {
    fn is_active(&self) -> bool {
        self.is_active
    }
}

impl Activatable for CaxCode {
    fn is_active(&self) -> bool {
        self.is_active
    }
}

impl Activatable for Patient {
    fn is_active(&self) -> bool {
        self.is_active
    }
}
