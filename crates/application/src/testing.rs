//! Test doubles for the application ports.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use medhist_domain::{RawResponse, TokenPair};
use parking_lot::Mutex;

use crate::client::ApiClient;
use crate::ports::{
    FileSink, FileSinkError, HttpTransport, Navigator, Notifier, PreparedRequest, SessionStore,
    SessionStoreError, TransportError,
};

pub const BASE_URL: &str = "http://api.test";

type Handler = dyn Fn(&PreparedRequest) -> Result<RawResponse, TransportError> + Send + Sync;

/// Scripted transport: every request goes through `handler`, optionally
/// after a per-path delay, and is recorded.
pub struct MockTransport {
    handler: Box<Handler>,
    delays: HashMap<String, Duration>,
    requests: Mutex<Vec<PreparedRequest>>,
}

impl MockTransport {
    pub fn new(
        handler: impl Fn(&PreparedRequest) -> Result<RawResponse, TransportError>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        Self {
            handler: Box::new(handler),
            delays: HashMap::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn ok() -> Self {
        Self::new(|_| Ok(RawResponse::new(204, "")))
    }

    pub fn with_delay(mut self, path: &str, delay: Duration) -> Self {
        self.delays.insert(path.to_string(), delay);
        self
    }

    pub fn requests(&self) -> Vec<PreparedRequest> {
        self.requests.lock().clone()
    }

    pub fn count(&self, path: &str) -> usize {
        self.requests
            .lock()
            .iter()
            .filter(|r| path_of(r) == path)
            .count()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: &PreparedRequest) -> Result<RawResponse, TransportError> {
        self.requests.lock().push(request.clone());
        if let Some(delay) = self.delays.get(path_of(request)) {
            tokio::time::sleep(*delay).await;
        } else {
            tokio::task::yield_now().await;
        }
        (self.handler)(request)
    }
}

/// Path of a prepared request without origin and query.
pub fn path_of(request: &PreparedRequest) -> &str {
    let rest = request.url.strip_prefix(BASE_URL).unwrap_or(&request.url);
    rest.split('?').next().unwrap_or(rest)
}

/// Bearer token of a prepared request, if any.
pub fn token_of(request: &PreparedRequest) -> Option<&str> {
    request
        .header("authorization")
        .and_then(|h| h.strip_prefix("Bearer "))
}

#[derive(Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn routes(&self) -> Vec<String> {
        self.routes.lock().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: &str) {
        self.routes.lock().push(route.to_string());
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Loading(String),
    Success(String),
    Error(String),
    Dismiss(String),
}

#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn loading(&self, id: &str, _message: &str) {
        self.notices.lock().push(Notice::Loading(id.to_string()));
    }

    fn success(&self, id: &str, _message: &str) {
        self.notices.lock().push(Notice::Success(id.to_string()));
    }

    fn error(&self, id: &str, _message: &str) {
        self.notices.lock().push(Notice::Error(id.to_string()));
    }

    fn dismiss(&self, id: &str) {
        self.notices.lock().push(Notice::Dismiss(id.to_string()));
    }
}

#[derive(Default)]
pub struct MemorySink {
    files: Mutex<Vec<(String, Vec<u8>)>>,
}

impl MemorySink {
    pub fn files(&self) -> Vec<(String, Vec<u8>)> {
        self.files.lock().clone()
    }
}

#[async_trait]
impl FileSink for MemorySink {
    async fn save(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf, FileSinkError> {
        self.files.lock().push((filename.to_string(), bytes.to_vec()));
        Ok(PathBuf::from("/downloads").join(filename))
    }
}

#[derive(Default)]
pub struct MemorySessions {
    tokens: Mutex<Option<TokenPair>>,
    session_id: Mutex<Option<String>>,
    filters: Mutex<Option<serde_json::Value>>,
}

impl MemorySessions {
    pub fn with_tokens(tokens: TokenPair) -> Self {
        let store = Self::default();
        *store.tokens.lock() = Some(tokens);
        store
    }

    pub fn tokens(&self) -> Option<TokenPair> {
        self.tokens.lock().clone()
    }
}

#[async_trait]
impl SessionStore for MemorySessions {
    async fn load_tokens(&self) -> Result<Option<TokenPair>, SessionStoreError> {
        Ok(self.tokens.lock().clone())
    }

    async fn save_tokens(&self, tokens: &TokenPair) -> Result<(), SessionStoreError> {
        *self.tokens.lock() = Some(tokens.clone());
        Ok(())
    }

    async fn clear_tokens(&self) -> Result<(), SessionStoreError> {
        *self.tokens.lock() = None;
        Ok(())
    }

    async fn load_session_id(&self) -> Result<Option<String>, SessionStoreError> {
        Ok(self.session_id.lock().clone())
    }

    async fn save_session_id(&self, session_id: &str) -> Result<(), SessionStoreError> {
        *self.session_id.lock() = Some(session_id.to_string());
        Ok(())
    }

    async fn load_filters(&self) -> Result<Option<serde_json::Value>, SessionStoreError> {
        Ok(self.filters.lock().clone())
    }

    async fn save_filters(&self, filters: &serde_json::Value) -> Result<(), SessionStoreError> {
        *self.filters.lock() = Some(filters.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), SessionStoreError> {
        *self.tokens.lock() = None;
        *self.session_id.lock() = None;
        *self.filters.lock() = None;
        Ok(())
    }
}

/// A client wired to test doubles.
pub struct Harness {
    pub client: ApiClient,
    pub transport: Arc<MockTransport>,
    pub sessions: Arc<MemorySessions>,
    pub navigator: Arc<RecordingNavigator>,
}

impl Harness {
    pub fn new(transport: MockTransport) -> Self {
        Self::with_sessions(transport, MemorySessions::default())
    }

    pub fn with_sessions(transport: MockTransport, sessions: MemorySessions) -> Self {
        let transport = Arc::new(transport);
        let sessions = Arc::new(sessions);
        let navigator = Arc::new(RecordingNavigator::default());
        let client = ApiClient::builder(BASE_URL, transport.clone())
            .session_store(sessions.clone())
            .navigator(navigator.clone())
            .build();
        Self {
            client,
            transport,
            sessions,
            navigator,
        }
    }
}
