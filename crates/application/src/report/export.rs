//! Spreadsheet export of filtered medical histories.
//!
//! Unlike document reports, exports expose an explicit status endpoint:
//! the job is checked until it reports `SUCCESS` with a result path, which
//! is then downloaded. Any other state, known or not, counts as running.

use std::path::PathBuf;

use medhist_domain::entities::MedicalHistoryFilters;
use medhist_domain::{ApiRequest, ReportTask, TaskState, TaskStatus};
use tracing::{debug, info};

use super::poller::ReportPoller;
use crate::error::{ApiError, ApplicationError, ApplicationResult};

/// Path that starts an export job.
pub const EXPORT_PATH: &str = "/medical_history/export";

/// Status endpoint of an export job.
#[must_use]
pub fn export_status_path(task: &ReportTask) -> String {
    format!("/medical_history/tasks/status/{}", task.task_id)
}

impl ReportPoller {
    /// Starts exporting the histories matching `filters`.
    ///
    /// # Errors
    ///
    /// Returns the API error of the start call.
    pub async fn start_export(
        &self,
        filters: &MedicalHistoryFilters,
    ) -> Result<ReportTask, ApiError> {
        let request = ApiRequest::post(EXPORT_PATH).query(filters.to_query());
        let task: ReportTask = self.client.json(request).await?;
        info!(task_id = %task.task_id, "export job started");
        Ok(task)
    }

    /// Checks the export job until it finishes, then downloads the result.
    ///
    /// The first check happens immediately; later ones wait the policy
    /// interval.
    ///
    /// # Errors
    ///
    /// Returns `ReportFailed` for a `FAILURE` state, the API error of a
    /// status or download call, or `PollExhausted`.
    pub async fn poll_export(
        &self,
        task: &ReportTask,
        correlation_id: &str,
    ) -> ApplicationResult<PathBuf> {
        let status_path = export_status_path(task);
        let mut attempts = 0;

        loop {
            if self.policy.exhausted(attempts) {
                return Err(self.fail(correlation_id, ApplicationError::PollExhausted { attempts }));
            }
            attempts += 1;

            let status: TaskStatus = match self.client.json(ApiRequest::get(status_path.as_str())).await
            {
                Ok(status) => status,
                Err(err) => return Err(self.fail(correlation_id, err.into())),
            };

            match (status.state, status.result_path()) {
                (TaskState::Success, Some(result_path)) => {
                    let bytes = match self.client.blob(ApiRequest::get(result_path)).await {
                        Ok(bytes) => bytes,
                        Err(err) => return Err(self.fail(correlation_id, err.into())),
                    };
                    return self
                        .deliver(&status.result_filename(), &bytes, correlation_id)
                        .await;
                }
                (TaskState::Failure, _) => {
                    let err = ApplicationError::ReportFailed(
                        "the server failed to generate the report".to_string(),
                    );
                    return Err(self.fail(correlation_id, err));
                }
                // SUCCESS without a result path means the file is not published yet.
                (state, _) => {
                    debug!(task_id = %task.task_id, ?state, "export not ready");
                }
            }
            tokio::time::sleep(self.policy.interval).await;
        }
    }

    /// Starts an export and waits for the spreadsheet.
    ///
    /// # Errors
    ///
    /// See [`ReportPoller::start_export`] and [`ReportPoller::poll_export`].
    pub async fn export(
        &self,
        filters: &MedicalHistoryFilters,
        correlation_id: &str,
    ) -> ApplicationResult<PathBuf> {
        self.notifier
            .loading(correlation_id, "Exporting medical histories...");
        let task = match self.start_export(filters).await {
            Ok(task) => task,
            Err(err) => return Err(self.fail(correlation_id, err.into())),
        };
        self.poll_export(&task, correlation_id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::report::PollPolicy;
    use crate::testing::{Harness, MemorySink, MockTransport, RecordingNotifier, path_of};
    use medhist_domain::RawResponse;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn poller(transport: MockTransport) -> (ReportPoller, Harness, Arc<MemorySink>) {
        let harness = Harness::new(transport);
        let sink = Arc::new(MemorySink::default());
        let poller = ReportPoller::new(
            harness.client.clone(),
            sink.clone(),
            Arc::new(RecordingNotifier::default()),
        );
        (poller, harness, sink)
    }

    #[tokio::test(start_paused = true)]
    async fn test_export_downloads_result() {
        let checks = AtomicUsize::new(0);
        let (poller, harness, sink) = poller(MockTransport::new(move |req| match path_of(req) {
            EXPORT_PATH => Ok(RawResponse::json(200, &json!({"task_id": "t9"}))),
            "/medical_history/tasks/status/t9" => {
                if checks.fetch_add(1, Ordering::SeqCst) == 0 {
                    Ok(RawResponse::json(200, &json!({"state": "PROGRESS"})))
                } else {
                    Ok(RawResponse::json(
                        200,
                        &json!({"state": "SUCCESS", "result": "static/reports/march.xlsx"}),
                    ))
                }
            }
            "/static/reports/march.xlsx" => Ok(RawResponse::new(200, b"xlsx".to_vec())),
            other => panic!("unexpected request {other}"),
        }));

        let filters = MedicalHistoryFilters {
            full_name: Some(" Петров ".to_string()),
            start_date: Some("2024-03-01".to_string()),
            end_date: None,
        };
        let saved = poller.export(&filters, "export").await.unwrap();

        assert_eq!(saved, PathBuf::from("/downloads/march.xlsx"));
        assert_eq!(sink.files(), vec![("march.xlsx".to_string(), b"xlsx".to_vec())]);

        let start = &harness.transport.requests()[0];
        assert!(start.url.ends_with("?full_name=%D0%9F%D0%B5%D1%82%D1%80%D0%BE%D0%B2&start_date=2024-03-01"));
        assert_eq!(harness.transport.count("/medical_history/tasks/status/t9"), 2);
    }

    #[tokio::test]
    async fn test_export_failure_state() {
        let (poller, _harness, sink) = poller(MockTransport::new(|_| {
            Ok(RawResponse::json(200, &json!({"state": "FAILURE"})))
        }));
        let err = poller
            .poll_export(&ReportTask::new("t1"), "export")
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::ReportFailed(_)));
        assert!(sink.files().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_without_result_keeps_polling() {
        let checks = AtomicUsize::new(0);
        let (poller, harness, sink) = poller(MockTransport::new(move |req| match path_of(req) {
            "/medical_history/tasks/status/t1" => {
                let body = match checks.fetch_add(1, Ordering::SeqCst) {
                    0 => json!({"state": "STARTED"}),
                    1 => json!({"state": "SUCCESS", "result": null}),
                    2 => json!({"state": "RETRY"}),
                    _ => json!({"state": "SUCCESS", "result": "/static/reports/all.xlsx"}),
                };
                Ok(RawResponse::json(200, &body))
            }
            "/static/reports/all.xlsx" => Ok(RawResponse::new(200, b"xlsx".to_vec())),
            other => panic!("unexpected request {other}"),
        }));

        let saved = poller
            .poll_export(&ReportTask::new("t1"), "export")
            .await
            .unwrap();

        assert_eq!(saved, PathBuf::from("/downloads/all.xlsx"));
        assert_eq!(sink.files().len(), 1);
        assert_eq!(harness.transport.count("/medical_history/tasks/status/t1"), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_without_result_until_bound() {
        let (poller, _harness, sink) = poller(MockTransport::new(|_| {
            Ok(RawResponse::json(200, &json!({"state": "SUCCESS"})))
        }));
        let poller = poller.with_policy(PollPolicy {
            interval: std::time::Duration::from_millis(5),
            max_attempts: Some(2),
        });
        let err = poller
            .poll_export(&ReportTask::new("t1"), "export")
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::PollExhausted { attempts: 2 }));
        assert!(sink.files().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_export_respects_attempt_bound() {
        let (poller, _harness, _sink) = poller(MockTransport::new(|_| {
            Ok(RawResponse::json(200, &json!({"state": "PENDING"})))
        }));
        let poller = poller.with_policy(PollPolicy {
            interval: std::time::Duration::from_millis(5),
            max_attempts: Some(3),
        });
        let err = poller
            .poll_export(&ReportTask::new("t1"), "export")
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::PollExhausted { attempts: 3 }));
    }
}
