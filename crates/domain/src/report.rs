//! Asynchronous report generation types.
//!
//! A report is produced by a server-side job: the client starts the job,
//! receives a [`ReportTask`], then polls until the document is ready.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Fallback file name for spreadsheet exports.
pub const DEFAULT_EXPORT_FILENAME: &str = "medical_report.xlsx";

/// Handle of a server-side report job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReportTask {
    /// Server-assigned task id
    pub task_id: String,
}

impl ReportTask {
    /// Creates a task handle.
    #[must_use]
    pub fn new(task_id: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
        }
    }
}

/// The document a report job renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportKind {
    /// Full medical history document
    MedicalHistory,
    /// Operation protocol document
    Operation,
}

impl ReportKind {
    /// Path that starts generation for the record `target_id`.
    #[must_use]
    pub fn start_path(self, target_id: i64) -> String {
        match self {
            Self::MedicalHistory => format!("/medical_history/{target_id}/report-async"),
            Self::Operation => format!("/medical_history/operations/{target_id}/report-async"),
        }
    }

    /// Path that returns the rendered document once the job is done.
    #[must_use]
    pub fn result_path(self, task: &ReportTask) -> String {
        match self {
            Self::MedicalHistory => format!("/report-task/{}", task.task_id),
            Self::Operation => format!("/operation-report-task/{}", task.task_id),
        }
    }

    /// File name for a document whose record carries no better name.
    #[must_use]
    pub fn default_filename(self, target_id: i64) -> String {
        match self {
            Self::MedicalHistory => format!("История_болезни_{target_id}.docx"),
            Self::Operation => format!("Протокол_операции_{target_id}.docx"),
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MedicalHistory => f.write_str("medical history"),
            Self::Operation => f.write_str("operation protocol"),
        }
    }
}

/// State of an export job as reported by the status endpoint.
///
/// States the client does not know are decoded as [`TaskState::Other`]
/// and treated as still running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TaskState {
    /// Queued
    Pending,
    /// Running
    #[serde(alias = "STARTED")]
    Progress,
    /// Finished; the result path is set when a file was produced
    Success,
    /// Finished with an error
    Failure,
    /// Any other state, e.g. `RETRY`
    #[serde(other)]
    Other,
}

/// Response of `GET /medical_history/tasks/status/{task_id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStatus {
    /// Current state
    pub state: TaskState,
    /// Server-relative path of the produced file, on success
    #[serde(default)]
    pub result: Option<String>,
}

impl TaskStatus {
    /// Returns the absolute API path of the produced file, if any.
    #[must_use]
    pub fn result_path(&self) -> Option<String> {
        let result = self.result.as_deref().filter(|r| !r.is_empty())?;
        if result.starts_with('/') {
            Some(result.to_string())
        } else {
            Some(format!("/{result}"))
        }
    }

    /// File name to save the result under: the last path segment.
    #[must_use]
    pub fn result_filename(&self) -> String {
        self.result
            .as_deref()
            .and_then(|r| r.rsplit('/').next())
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_EXPORT_FILENAME)
            .to_string()
    }
}
