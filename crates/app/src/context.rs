//! Wiring of adapters into the application services.

use std::sync::Arc;

use anyhow::Context;
use medhist_application::ports::{Navigator, Notifier, SessionStore};
use medhist_application::{ApiClient, AuthService, FilterSession, ReportPoller};
use medhist_domain::UserRead;
use medhist_infrastructure::{
    ClientConfig, DownloadDirSink, FileSessionStore, InMemorySessionStore, ReqwestTransport,
    SystemClock, TracingNavigator, TracingNotifier,
};

/// Everything a command needs, built once per process.
pub struct App {
    client: ApiClient,
    auth: AuthService,
    poller: ReportPoller,
    filters: FilterSession,
    navigator: Arc<TracingNavigator>,
}

impl App {
    /// Builds the application from configuration.
    ///
    /// With `ephemeral` set the session is kept in memory only.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created or no session
    /// location is available.
    pub fn from_config(config: &ClientConfig, ephemeral: bool) -> anyhow::Result<Self> {
        let sessions: Arc<dyn SessionStore> = if ephemeral {
            Arc::new(InMemorySessionStore::new())
        } else if let Some(path) = &config.session_file {
            Arc::new(FileSessionStore::new(path))
        } else {
            Arc::new(FileSessionStore::at_default_location()?)
        };
        Self::with_sessions(config, sessions)
    }

    /// Builds the application around an existing session store.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn with_sessions(
        config: &ClientConfig,
        sessions: Arc<dyn SessionStore>,
    ) -> anyhow::Result<Self> {
        let transport = ReqwestTransport::new(config.request_timeout)
            .context("failed to create the HTTP client")?;
        let navigator = Arc::new(TracingNavigator::new());
        let notifier: Arc<dyn Notifier> = Arc::new(TracingNotifier);
        let download_dir = config
            .download_dir
            .clone()
            .unwrap_or_else(DownloadDirSink::default_dir);

        let client = ApiClient::builder(config.base_url(), Arc::new(transport))
            .session_store(sessions.clone())
            .navigator(navigator.clone() as Arc<dyn Navigator>)
            .build();
        let auth = AuthService::new(client.clone()).with_notifier(notifier.clone());
        let poller = ReportPoller::new(
            client.clone(),
            Arc::new(DownloadDirSink::new(download_dir)),
            notifier,
        )
        .with_policy(config.poll_policy());
        let filters = FilterSession::new(sessions, Arc::new(SystemClock::new()));

        Ok(Self {
            client,
            auth,
            poller,
            filters,
            navigator,
        })
    }

    /// The authenticated API client.
    #[must_use]
    pub const fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Sign-in and session restore.
    #[must_use]
    pub const fn auth(&self) -> &AuthService {
        &self.auth
    }

    /// Report jobs and exports.
    #[must_use]
    pub const fn poller(&self) -> &ReportPoller {
        &self.poller
    }

    /// Remembered history filters.
    #[must_use]
    pub const fn filters(&self) -> &FilterSession {
        &self.filters
    }

    /// The route the session was last sent to, if it ended.
    #[must_use]
    pub fn redirected_to(&self) -> Option<String> {
        self.navigator.last_route()
    }

    /// Restores the saved session, failing if there is none.
    ///
    /// # Errors
    ///
    /// Returns an error if nobody is signed in or the session has expired.
    pub async fn require_session(&self) -> anyhow::Result<UserRead> {
        self.auth
            .restore()
            .await?
            .context("not signed in, run `medhist login <username>` first")
    }
}
