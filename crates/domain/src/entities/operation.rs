use serde::{Deserialize, Serialize};

/// An operation protocol attached to a medical history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    /// Record id
    pub id: i64,
    /// Operation name
    pub oper_name: String,
    /// Free-text protocol
    pub oper_protocol: String,
    /// Owning medical history
    pub medical_history_id: i64,
    /// Creation timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Last update timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Payload for creating or updating an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationCreate {
    /// Operation name
    pub oper_name: String,
    /// Free-text protocol
    pub oper_protocol: String,
    /// Owning medical history
    pub medical_history_id: i64,
}
