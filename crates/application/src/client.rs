//! Authenticated API client
//!
//! [`ApiClient`] is the entry point every typed API goes through. It reads
//! the current access token per call, waits behind an in-flight refresh,
//! and replays a request once after a 401 has been recovered.

use std::sync::Arc;

use medhist_domain::{ApiRequest, ResponseBody};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::auth::{Recovery, RefreshCoordinator, TokenStore};
use crate::error::ApiError;
use crate::executor::RequestExecutor;
use crate::ports::{HttpTransport, Navigator, SessionStore};

/// A cloneable handle to one authenticated session against the API.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<Inner>,
}

struct Inner {
    executor: RequestExecutor,
    tokens: TokenStore,
    refresh: RefreshCoordinator,
    sessions: Option<Arc<dyn SessionStore>>,
    navigator: Option<Arc<dyn Navigator>>,
}

/// Builder for [`ApiClient`].
pub struct ApiClientBuilder {
    base_url: String,
    transport: Arc<dyn HttpTransport>,
    tokens: TokenStore,
    sessions: Option<Arc<dyn SessionStore>>,
    navigator: Option<Arc<dyn Navigator>>,
}

impl ApiClientBuilder {
    /// Uses an existing token store.
    #[must_use]
    pub fn tokens(mut self, tokens: TokenStore) -> Self {
        self.tokens = tokens;
        self
    }

    /// Persists tokens and filters through `sessions`.
    #[must_use]
    pub fn session_store(mut self, sessions: Arc<dyn SessionStore>) -> Self {
        self.sessions = Some(sessions);
        self
    }

    /// Sends session-ending redirects to `navigator`.
    #[must_use]
    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    /// Builds the client.
    #[must_use]
    pub fn build(self) -> ApiClient {
        let refresh = RefreshCoordinator::new(
            self.tokens.clone(),
            self.sessions.clone(),
            self.navigator.clone(),
        );
        ApiClient {
            inner: Arc::new(Inner {
                executor: RequestExecutor::new(self.base_url, self.transport),
                tokens: self.tokens,
                refresh,
                sessions: self.sessions,
                navigator: self.navigator,
            }),
        }
    }
}

impl ApiClient {
    /// Starts building a client for `base_url`.
    pub fn builder(base_url: impl Into<String>, transport: Arc<dyn HttpTransport>) -> ApiClientBuilder {
        ApiClientBuilder {
            base_url: base_url.into(),
            transport,
            tokens: TokenStore::new(),
            sessions: None,
            navigator: None,
        }
    }

    /// Returns the session's token store.
    #[must_use]
    pub fn tokens(&self) -> &TokenStore {
        &self.inner.tokens
    }

    /// Returns the underlying executor.
    #[must_use]
    pub fn executor(&self) -> &RequestExecutor {
        &self.inner.executor
    }

    /// Returns the refresh coordinator.
    #[must_use]
    pub fn refresh(&self) -> &RefreshCoordinator {
        &self.inner.refresh
    }

    /// Returns the session store, if one is configured.
    #[must_use]
    pub fn session_store(&self) -> Option<&Arc<dyn SessionStore>> {
        self.inner.sessions.as_ref()
    }

    /// Returns the navigator, if one is configured.
    #[must_use]
    pub fn navigator(&self) -> Option<&Arc<dyn Navigator>> {
        self.inner.navigator.as_ref()
    }

    /// Executes a request on behalf of the session.
    ///
    /// A 401 on an authenticated request triggers (or joins) a token refresh
    /// and the request is replayed exactly once with the new token. A second
    /// 401 is returned as is.
    ///
    /// # Errors
    ///
    /// Returns the request's `ApiError`, or the refresh error if recovering
    /// the session failed.
    pub async fn execute(&self, request: &ApiRequest) -> Result<ResponseBody, ApiError> {
        if !request.no_auth {
            self.inner.refresh.settled().await;
        }
        let access = self.inner.tokens.access_token().await;
        let executor = &self.inner.executor;

        match executor.execute(request, access.as_deref()).await {
            Err(err) if err.is_unauthorized() && !request.no_auth => {
                match self.inner.refresh.recover(executor, access.as_deref()).await? {
                    Recovery::Retry(tokens) => {
                        debug!(path = %request.path, "replaying request with refreshed token");
                        executor.execute(request, Some(&tokens.access_token)).await
                    }
                    Recovery::Unavailable => Err(err),
                }
            }
            other => other,
        }
    }

    /// Executes a request and deserializes its JSON body.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::execute`]; `ApiError::Decode` if the body has the
    /// wrong shape.
    pub async fn json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiError> {
        let body = self.execute(&request).await?;
        serde_json::from_value(body.into_json()).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Executes a request whose body is a binary document.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::execute`].
    pub async fn blob(&self, request: ApiRequest) -> Result<Vec<u8>, ApiError> {
        Ok(self.execute(&request.blob()).await?.into_bytes())
    }

    /// Executes a request whose body is plain text.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::execute`].
    pub async fn text(&self, request: ApiRequest) -> Result<String, ApiError> {
        let bytes = self.execute(&request.text()).await?.into_bytes();
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Executes a request whose response body is irrelevant.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::execute`].
    pub async fn empty(&self, request: ApiRequest) -> Result<(), ApiError> {
        self.execute(&request).await.map(|_| ())
    }
}
