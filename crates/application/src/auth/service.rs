//! Sign-in, session restore and sign-out.

use std::sync::Arc;

use medhist_domain::{ApiRequest, Credentials, TokenResponse, UserRead, generate_session_id};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::refresh::Recovery;
use crate::client::ApiClient;
use crate::error::{ApiError, ApplicationResult};
use crate::ports::{LOGIN_ROUTE, Notifier};

/// Path of the credential exchange endpoint.
pub const LOGIN_PATH: &str = "/auth/login";

/// Path of the current-user endpoint.
pub const ME_PATH: &str = "/auth/me";

const LOGIN_NOTICE: &str = "login";

/// Manages the signed-in user of an [`ApiClient`].
pub struct AuthService {
    client: ApiClient,
    notifier: Option<Arc<dyn Notifier>>,
    user: RwLock<Option<UserRead>>,
}

impl AuthService {
    /// Creates the service.
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            notifier: None,
            user: RwLock::new(None),
        }
    }

    /// Reports sign-in progress through `notifier`.
    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Returns the signed-in user, if any.
    pub async fn current_user(&self) -> Option<UserRead> {
        self.user.read().await.clone()
    }

    /// Exchanges credentials for tokens and loads the user profile.
    ///
    /// Tokens are kept in memory and persisted, and a fresh filter session
    /// is started.
    ///
    /// # Errors
    ///
    /// Returns the API error of the login or profile call, or a session
    /// storage error.
    pub async fn login(&self, credentials: &Credentials) -> ApplicationResult<UserRead> {
        self.notify(|n| n.loading(LOGIN_NOTICE, "Signing in..."));
        match self.login_inner(credentials).await {
            Ok(user) => {
                self.notify(|n| {
                    n.success(LOGIN_NOTICE, &format!("Welcome, {}!", user.username));
                });
                Ok(user)
            }
            Err(err) => {
                let message = err.to_string();
                self.notify(|n| n.error(LOGIN_NOTICE, &message));
                Err(err)
            }
        }
    }

    async fn login_inner(&self, credentials: &Credentials) -> ApplicationResult<UserRead> {
        let request = ApiRequest::post(LOGIN_PATH)
            .no_auth()
            .form(credentials.form_fields());
        let response: TokenResponse = self.client.json(request).await?;
        let tokens = response.into_pair("");

        self.client.tokens().set(tokens.clone()).await;
        if let Some(sessions) = self.client.session_store() {
            sessions.save_tokens(&tokens).await?;
            sessions.save_session_id(&generate_session_id()).await?;
        }

        let user = self.me().await?;
        info!(username = %user.username, "signed in");
        Ok(user)
    }

    /// Loads the current user from `/auth/me` and caches it.
    ///
    /// # Errors
    ///
    /// Returns the API error of the profile call.
    pub async fn me(&self) -> Result<UserRead, ApiError> {
        let user: UserRead = self.client.json(ApiRequest::get(ME_PATH)).await?;
        *self.user.write().await = Some(user.clone());
        Ok(user)
    }

    /// Resumes a persisted session.
    ///
    /// Returns `None` when nothing usable is persisted. A 401 on the profile
    /// check is already handled by the client's own refresh; any other
    /// failure gets one explicit refresh before the session is discarded.
    ///
    /// # Errors
    ///
    /// Returns a session storage error; API failures end in `Ok(None)`.
    pub async fn restore(&self) -> ApplicationResult<Option<UserRead>> {
        let Some(sessions) = self.client.session_store() else {
            return Ok(None);
        };
        let Some(tokens) = sessions.load_tokens().await? else {
            return Ok(None);
        };
        if tokens.access_token.is_empty() || tokens.refresh_token.is_empty() {
            return Ok(None);
        }

        self.client.tokens().set(tokens).await;
        let retried = match self.me().await {
            Ok(user) => return Ok(Some(user)),
            // The client has already refreshed and replayed the call once.
            Err(err) if err.is_unauthorized() => None,
            Err(err) => {
                debug!(error = %err, "profile check failed, refreshing once");
                match self.client.refresh().refresh_now(self.client.executor()).await {
                    Ok(Recovery::Retry(_)) => self.me().await.ok(),
                    Ok(Recovery::Unavailable) | Err(_) => None,
                }
            }
        };
        if retried.is_none() {
            warn!("persisted session could not be resumed");
            self.client.tokens().clear_tokens().await;
            sessions.clear_tokens().await?;
            *self.user.write().await = None;
        }
        Ok(retried)
    }

    /// Ends the session: forgets tokens and saved state, then redirects to
    /// the login route.
    ///
    /// # Errors
    ///
    /// Returns a session storage error; memory is cleared regardless.
    pub async fn logout(&self) -> ApplicationResult<()> {
        self.client.tokens().clear_tokens().await;
        *self.user.write().await = None;
        let cleared = match self.client.session_store() {
            Some(sessions) => sessions.clear().await,
            None => Ok(()),
        };
        self.notify(|n| n.success("logout", "Signed out"));
        if let Some(navigator) = self.client.navigator() {
            navigator.navigate(LOGIN_ROUTE);
        }
        cleared.map_err(Into::into)
    }

    fn notify(&self, f: impl FnOnce(&dyn Notifier)) {
        if let Some(notifier) = &self.notifier {
            f(notifier.as_ref());
        }
    }
}
