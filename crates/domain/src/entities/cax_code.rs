use serde::{Deserialize, Serialize};

/// A tariff (CAX) code governing the expected length of stay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaxCode {
    /// Record id
    pub id: i64,
    /// Numeric tariff code
    pub cax_code: i64,
    /// Display name
    pub cax_name: String,
    /// Expected length of stay in days
    #[serde(default)]
    pub quantity_of_days: Option<i64>,
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

/// Payload for creating or updating a tariff code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaxCodeCreate {
    /// Numeric tariff code
    pub cax_code: i64,
    /// Display name
    pub cax_name: String,
    /// Expected length of stay in days
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity_of_days: Option<i64>,
}
