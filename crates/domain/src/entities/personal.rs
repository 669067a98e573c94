use serde::{Deserialize, Serialize};

/// Which staff collection a [`Personal`] record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StaffKind {
    /// `/doctors`
    Doctor,
    /// `/nurses`
    Nurse,
}

impl StaffKind {
    /// Returns the collection path.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Doctor => "/doctors",
            Self::Nurse => "/nurses",
        }
    }
}

/// A doctor or nurse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Personal {
    /// Record id
    pub id: i64,
    /// Full name
    pub full_name: String,
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

/// Payload for creating or renaming a staff member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalCreate {
    /// Full name
    pub full_name: String,
}

impl PersonalCreate {
    /// Creates the payload.
    #[must_use]
    pub fn new(full_name: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
        }
    }
}
