//! Fire-and-poll report generation.
//!
//! The server renders documents asynchronously: a start call returns a
//! task id, and the result endpoint answers 202 until the document is
//! ready. [`ReportPoller`] turns that into one awaitable completion and
//! reports progress through the [`Notifier`] under a correlation id.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use medhist_domain::{ApiRequest, ReportKind, ReportTask};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::client::ApiClient;
use crate::error::{ApiError, ApplicationError, ApplicationResult};
use crate::ports::{FileSink, Notifier};

/// Delay before every status check.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2000);

/// Checks performed before giving up (about ten minutes at the default
/// interval).
pub const DEFAULT_MAX_ATTEMPTS: u32 = 300;

/// Cadence and bound of a polling loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Fixed delay between checks
    pub interval: Duration,
    /// Maximum number of checks; `None` polls until a terminal answer
    pub max_attempts: Option<u32>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: Some(DEFAULT_MAX_ATTEMPTS),
        }
    }
}

impl PollPolicy {
    /// A policy without an attempt bound.
    #[must_use]
    pub const fn unbounded(interval: Duration) -> Self {
        Self {
            interval,
            max_attempts: None,
        }
    }

    pub(crate) fn exhausted(&self, attempts: u32) -> bool {
        self.max_attempts.is_some_and(|max| attempts >= max)
    }
}

/// Starts report jobs and waits for their documents.
#[derive(Clone)]
pub struct ReportPoller {
    pub(crate) client: ApiClient,
    pub(crate) sink: Arc<dyn FileSink>,
    pub(crate) notifier: Arc<dyn Notifier>,
    pub(crate) policy: PollPolicy,
}

impl ReportPoller {
    /// Creates a poller with the default policy.
    pub fn new(client: ApiClient, sink: Arc<dyn FileSink>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            client,
            sink,
            notifier,
            policy: PollPolicy::default(),
        }
    }

    /// Replaces the polling policy.
    #[must_use]
    pub const fn with_policy(mut self, policy: PollPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Returns the polling policy.
    #[must_use]
    pub const fn policy(&self) -> PollPolicy {
        self.policy
    }

    /// Asks the server to start rendering `kind` for record `target_id`.
    ///
    /// Returns as soon as the job is queued.
    ///
    /// # Errors
    ///
    /// Returns the API error of the start call.
    pub async fn start_job(&self, kind: ReportKind, target_id: i64) -> Result<ReportTask, ApiError> {
        let task: ReportTask = self
            .client
            .json(ApiRequest::post(kind.start_path(target_id)))
            .await?;
        info!(%kind, target_id, task_id = %task.task_id, "report job started");
        Ok(task)
    }

    /// Polls the job until its document arrives, then saves it as `filename`.
    ///
    /// Each check waits the policy interval first. A 202 answer schedules
    /// another check; any other failure stops polling. The outcome is also
    /// signalled through the notifier under `correlation_id`.
    ///
    /// # Errors
    ///
    /// Returns the API error that stopped polling, a download error, or
    /// `PollExhausted` when the attempt bound is reached.
    pub async fn poll_until_ready(
        &self,
        kind: ReportKind,
        task: &ReportTask,
        filename: &str,
        correlation_id: &str,
    ) -> ApplicationResult<PathBuf> {
        let path = kind.result_path(task);
        let mut attempts = 0;

        loop {
            if self.policy.exhausted(attempts) {
                return Err(self.fail(correlation_id, ApplicationError::PollExhausted { attempts }));
            }
            tokio::time::sleep(self.policy.interval).await;
            attempts += 1;

            let request = ApiRequest::get(path.as_str()).pending_on_accepted();
            match self.client.blob(request).await {
                Ok(bytes) => return self.deliver(filename, &bytes, correlation_id).await,
                Err(err) if err.is_not_ready() => {
                    debug!(task_id = %task.task_id, attempts, "report not ready");
                }
                Err(err) => return Err(self.fail(correlation_id, err.into())),
            }
        }
    }

    /// Starts a job and waits for its document.
    ///
    /// # Errors
    ///
    /// See [`ReportPoller::start_job`] and [`ReportPoller::poll_until_ready`].
    pub async fn generate(
        &self,
        kind: ReportKind,
        target_id: i64,
        filename: &str,
        correlation_id: &str,
    ) -> ApplicationResult<PathBuf> {
        self.notifier
            .loading(correlation_id, &format!("Generating {kind} report..."));
        let task = match self.start_job(kind, target_id).await {
            Ok(task) => task,
            Err(err) => return Err(self.fail(correlation_id, err.into())),
        };
        self.poll_until_ready(kind, &task, filename, correlation_id)
            .await
    }

    /// Runs [`ReportPoller::poll_until_ready`] on a background task.
    pub fn spawn_poll(
        &self,
        kind: ReportKind,
        task: ReportTask,
        filename: impl Into<String>,
        correlation_id: impl Into<String>,
    ) -> JoinHandle<ApplicationResult<PathBuf>> {
        let poller = self.clone();
        let filename = filename.into();
        let correlation_id = correlation_id.into();
        tokio::spawn(async move {
            poller
                .poll_until_ready(kind, &task, &filename, &correlation_id)
                .await
        })
    }

    pub(crate) async fn deliver(
        &self,
        filename: &str,
        bytes: &[u8],
        correlation_id: &str,
    ) -> ApplicationResult<PathBuf> {
        match self.sink.save(filename, bytes).await {
            Ok(saved) => {
                info!(path = %saved.display(), bytes = bytes.len(), "report saved");
                self.notifier.dismiss(correlation_id);
                self.notifier.success(correlation_id, "Report is ready");
                Ok(saved)
            }
            Err(err) => Err(self.fail(correlation_id, err.into())),
        }
    }

    pub(crate) fn fail(&self, correlation_id: &str, err: ApplicationError) -> ApplicationError {
        warn!(correlation_id, error = %err, "report failed");
        self.notifier.dismiss(correlation_id);
        self.notifier.error(correlation_id, &err.to_string());
        err
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::testing::{
        Harness, MemorySink, MockTransport, Notice, RecordingNotifier, path_of,
    };
    use medhist_domain::{RawResponse, TokenPair};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const DOCX: &[u8] = b"PK\x03\x04docx-bytes";

    struct Fixture {
        poller: ReportPoller,
        harness: Harness,
        sink: Arc<MemorySink>,
        notifier: Arc<RecordingNotifier>,
    }

    async fn fixture(transport: MockTransport) -> Fixture {
        let harness = Harness::new(transport);
        harness.client.tokens().set(TokenPair::new("a", "r")).await;
        let sink = Arc::new(MemorySink::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let poller = ReportPoller::new(harness.client.clone(), sink.clone(), notifier.clone());
        Fixture {
            poller,
            harness,
            sink,
            notifier,
        }
    }

    /// Result endpoint answers 202 `pending` times, then the document.
    fn job_backend(pending: usize) -> MockTransport {
        let polls = AtomicUsize::new(0);
        MockTransport::new(move |req| match path_of(req) {
            "/medical_history/5/report-async" => {
                Ok(RawResponse::json(200, &json!({"task_id": "abc"})))
            }
            "/report-task/abc" => {
                if polls.fetch_add(1, Ordering::SeqCst) < pending {
                    Ok(RawResponse::json(202, &json!({"detail": "Report is being generated"})))
                } else {
                    Ok(RawResponse::new(200, DOCX))
                }
            }
            other => panic!("unexpected request {other}"),
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_two_pending_polls_then_download() {
        let f = fixture(job_backend(2)).await;

        let task = f
            .poller
            .start_job(ReportKind::MedicalHistory, 5)
            .await
            .unwrap();
        assert_eq!(task, ReportTask::new("abc"));

        let started = tokio::time::Instant::now();
        let saved = f
            .poller
            .poll_until_ready(ReportKind::MedicalHistory, &task, "История_болезни_12.docx", "report-5")
            .await
            .unwrap();

        assert_eq!(saved, PathBuf::from("/downloads/История_болезни_12.docx"));
        assert_eq!(
            f.sink.files(),
            vec![("История_болезни_12.docx".to_string(), DOCX.to_vec())]
        );
        assert_eq!(f.harness.transport.count("/report-task/abc"), 3);
        assert!(started.elapsed() >= DEFAULT_POLL_INTERVAL * 3);
        assert_eq!(
            f.notifier.notices(),
            vec![
                Notice::Dismiss("report-5".to_string()),
                Notice::Success("report-5".to_string())
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_other_error_stops_polling() {
        let f = fixture(MockTransport::new(|_| {
            Ok(RawResponse::json(500, &json!({"detail": "Template missing"})))
        }))
        .await;

        let err = f
            .poller
            .poll_until_ready(ReportKind::Operation, &ReportTask::new("t1"), "op.docx", "op-1")
            .await
            .unwrap_err();
        assert_eq!(
            err.as_api().map(ApiError::message).as_deref(),
            Some("Template missing")
        );
        assert_eq!(f.harness.transport.count("/operation-report-task/t1"), 1);
        assert!(f.sink.files().is_empty());
        assert_eq!(
            f.notifier.notices().last(),
            Some(&Notice::Error("op-1".to_string()))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_attempt_bound_is_enforced() {
        let f = fixture(job_backend(usize::MAX)).await;
        let poller = f.poller.clone().with_policy(PollPolicy {
            interval: Duration::from_millis(10),
            max_attempts: Some(4),
        });

        let err = poller
            .poll_until_ready(ReportKind::MedicalHistory, &ReportTask::new("abc"), "x.docx", "r")
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::PollExhausted { attempts: 4 }));
        assert_eq!(f.harness.transport.count("/report-task/abc"), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_generate_in_background() {
        let f = fixture(job_backend(1)).await;

        let task = f
            .poller
            .start_job(ReportKind::MedicalHistory, 5)
            .await
            .unwrap();
        let handle = f
            .poller
            .spawn_poll(ReportKind::MedicalHistory, task, "h.docx", "bg");
        let saved = handle.await.unwrap().unwrap();
        assert_eq!(saved, PathBuf::from("/downloads/h.docx"));

        let again = f
            .poller
            .generate(ReportKind::MedicalHistory, 5, "h2.docx", "fg")
            .await
            .unwrap();
        assert_eq!(again, PathBuf::from("/downloads/h2.docx"));
        assert_eq!(
            f.notifier.notices().first(),
            Some(&Notice::Dismiss("bg".to_string()))
        );
    }
}
