//! Single-flight access-token refresh.
//!
//! When several requests hit a 401 at once, exactly one of them (the
//! leader) calls `/auth/refresh`; the others subscribe to the leader's
//! outcome and resume with it. The shared outcome travels over a
//! `watch` channel so late subscribers still see the published value.

use std::sync::Arc;

use medhist_domain::auth::{RefreshRequest, token_preview};
use medhist_domain::{ApiRequest, TokenPair, TokenResponse};
use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::token_store::TokenStore;
use crate::error::ApiError;
use crate::executor::RequestExecutor;
use crate::ports::{LOGIN_ROUTE, Navigator, SessionStore};

/// Path of the token refresh endpoint.
pub const REFRESH_PATH: &str = "/auth/refresh";

/// What a request that failed with 401 should do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recovery {
    /// Replay the request once with these tokens.
    Retry(TokenPair),
    /// No refresh token is held; surface the original error.
    Unavailable,
}

type Outcome = Result<Recovery, ApiError>;

enum State {
    Idle,
    Refreshing(watch::Receiver<Option<Outcome>>),
}

enum Role {
    Leader(watch::Sender<Option<Outcome>>),
    Follower(watch::Receiver<Option<Outcome>>),
}

/// Resets the coordinator to idle if the leader is dropped mid-refresh.
struct IdleOnDrop<'a> {
    state: &'a Mutex<State>,
    armed: bool,
}

impl Drop for IdleOnDrop<'_> {
    fn drop(&mut self) {
        if self.armed {
            *self.state.lock() = State::Idle;
        }
    }
}

/// Serializes token refreshes for one session.
pub struct RefreshCoordinator {
    state: Mutex<State>,
    tokens: TokenStore,
    sessions: Option<Arc<dyn SessionStore>>,
    navigator: Option<Arc<dyn Navigator>>,
}

impl RefreshCoordinator {
    /// Creates a coordinator that owns writes to `tokens`.
    #[must_use]
    pub fn new(
        tokens: TokenStore,
        sessions: Option<Arc<dyn SessionStore>>,
        navigator: Option<Arc<dyn Navigator>>,
    ) -> Self {
        Self {
            state: Mutex::new(State::Idle),
            tokens,
            sessions,
            navigator,
        }
    }

    /// Returns true while a refresh call is in flight.
    #[must_use]
    pub fn is_refreshing(&self) -> bool {
        matches!(*self.state.lock(), State::Refreshing(_))
    }

    /// Waits for an in-flight refresh, if any, to settle.
    ///
    /// The outcome is ignored; callers read the token store afterwards.
    pub async fn settled(&self) {
        let pending = match &*self.state.lock() {
            State::Refreshing(rx) => Some(rx.clone()),
            State::Idle => None,
        };
        if let Some(mut rx) = pending {
            let _ = rx.wait_for(Option::is_some).await;
        }
    }

    /// Recovers from a 401 received with `stale_access`.
    ///
    /// If another request already replaced that token, the current pair is
    /// returned without a network call. Otherwise the caller either starts
    /// the refresh or waits for the one in flight.
    ///
    /// # Errors
    ///
    /// Returns the refresh error. In that case the whole persisted session
    /// has been cleared and the navigator sent to the login route once.
    pub async fn recover(
        &self,
        executor: &RequestExecutor,
        stale_access: Option<&str>,
    ) -> Result<Recovery, ApiError> {
        if let Some(early) = self.current_recovery(stale_access).await {
            return Ok(early);
        }

        let role = {
            let mut state = self.state.lock();
            match &*state {
                State::Refreshing(rx) => Role::Follower(rx.clone()),
                State::Idle => {
                    let (tx, rx) = watch::channel(None);
                    *state = State::Refreshing(rx);
                    Role::Leader(tx)
                }
            }
        };

        match role {
            Role::Follower(mut rx) => {
                debug!("waiting for in-flight token refresh");
                let outcome = rx
                    .wait_for(Option::is_some)
                    .await
                    .ok()
                    .and_then(|published| published.clone());
                outcome.unwrap_or_else(|| Err(ApiError::refresh_aborted()))
            }
            Role::Leader(tx) => self.lead(executor, stale_access, &tx).await,
        }
    }

    /// Forces a refresh of the current pair, e.g. when a restored session
    /// fails its first profile check.
    ///
    /// # Errors
    ///
    /// See [`RefreshCoordinator::recover`].
    pub async fn refresh_now(&self, executor: &RequestExecutor) -> Result<Recovery, ApiError> {
        let current = self.tokens.access_token().await;
        self.recover(executor, current.as_deref()).await
    }

    async fn current_recovery(&self, stale_access: Option<&str>) -> Option<Recovery> {
        match self.tokens.snapshot().await {
            Some(current) if superseded(stale_access, &current) => Some(Recovery::Retry(current)),
            Some(current) if current.can_refresh() => None,
            _ => Some(Recovery::Unavailable),
        }
    }

    async fn lead(
        &self,
        executor: &RequestExecutor,
        stale_access: Option<&str>,
        tx: &watch::Sender<Option<Outcome>>,
    ) -> Outcome {
        let mut guard = IdleOnDrop {
            state: &self.state,
            armed: true,
        };

        // A refresh may have completed between the first check and taking the lead.
        if let Some(early) = self.current_recovery(stale_access).await {
            self.publish(tx, Ok(early.clone()));
            guard.armed = false;
            return Ok(early);
        }

        let previous_refresh = self.tokens.refresh_token().await.unwrap_or_default();
        info!(
            refresh_token = %token_preview(&previous_refresh),
            "refreshing access token"
        );

        let outcome = match exchange(executor, &previous_refresh).await {
            Ok(pair) => {
                self.tokens.set(pair.clone()).await;
                if let Some(sessions) = &self.sessions
                    && let Err(e) = sessions.save_tokens(&pair).await
                {
                    warn!(error = %e, "failed to persist refreshed tokens");
                }
                info!("access token refreshed");
                Ok(Recovery::Retry(pair))
            }
            Err(err) => {
                warn!(error = %err, "token refresh failed, ending session");
                self.tokens.clear_tokens().await;
                // Session id and remembered filters go with the tokens.
                if let Some(sessions) = &self.sessions
                    && let Err(e) = sessions.clear().await
                {
                    warn!(error = %e, "failed to clear persisted session");
                }
                Err(err)
            }
        };

        self.publish(tx, outcome.clone());
        guard.armed = false;

        if outcome.is_err()
            && let Some(navigator) = &self.navigator
        {
            navigator.navigate(LOGIN_ROUTE);
        }
        outcome
    }

    fn publish(&self, tx: &watch::Sender<Option<Outcome>>, outcome: Outcome) {
        let mut state = self.state.lock();
        *state = State::Idle;
        tx.send_replace(Some(outcome));
    }
}

fn superseded(stale_access: Option<&str>, current: &TokenPair) -> bool {
    !current.access_token.is_empty() && stale_access != Some(current.access_token.as_str())
}

async fn exchange(executor: &RequestExecutor, refresh_token: &str) -> Result<TokenPair, ApiError> {
    let request = ApiRequest::post(REFRESH_PATH)
        .no_auth()
        .json(&RefreshRequest {
            refresh_token: refresh_token.to_string(),
        })?;
    let body = executor.execute(&request, None).await?;
    let response: TokenResponse =
        serde_json::from_value(body.into_json()).map_err(|e| ApiError::Decode(e.to_string()))?;
    Ok(response.into_pair(refresh_token))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::testing::{BASE_URL, MemorySessions, MockTransport, RecordingNavigator};
    use medhist_domain::RawResponse;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::time::Duration;

    struct Fixture {
        coordinator: Arc<RefreshCoordinator>,
        executor: RequestExecutor,
        transport: Arc<MockTransport>,
        tokens: TokenStore,
        sessions: Arc<MemorySessions>,
        navigator: Arc<RecordingNavigator>,
    }

    fn fixture(transport: MockTransport) -> Fixture {
        let transport = Arc::new(transport);
        let tokens = TokenStore::with_tokens(TokenPair::new("old-access", "old-refresh"));
        let sessions = Arc::new(MemorySessions::with_tokens(TokenPair::new(
            "old-access",
            "old-refresh",
        )));
        let navigator = Arc::new(RecordingNavigator::default());
        let coordinator = Arc::new(RefreshCoordinator::new(
            tokens.clone(),
            Some(sessions.clone() as Arc<dyn SessionStore>),
            Some(navigator.clone() as Arc<dyn Navigator>),
        ));
        Fixture {
            coordinator,
            executor: RequestExecutor::new(BASE_URL, transport.clone()),
            transport,
            tokens,
            sessions,
            navigator,
        }
    }

    fn refresh_ok() -> MockTransport {
        MockTransport::new(|_| {
            Ok(RawResponse::json(
                200,
                &json!({"access_token": "new-access", "refresh_token": "new-refresh"}),
            ))
        })
    }

    #[tokio::test]
    async fn test_refresh_stores_and_persists_new_pair() {
        let f = fixture(refresh_ok());
        let outcome = f
            .coordinator
            .recover(&f.executor, Some("old-access"))
            .await
            .unwrap();

        let expected = TokenPair::new("new-access", "new-refresh");
        assert_eq!(outcome, Recovery::Retry(expected.clone()));
        assert_eq!(f.tokens.snapshot().await, Some(expected.clone()));
        assert_eq!(f.sessions.tokens(), Some(expected));
        assert!(!f.coordinator.is_refreshing());

        let sent = &f.transport.requests()[0];
        assert_eq!(sent.url, format!("{BASE_URL}/auth/refresh"));
        assert_eq!(sent.header("authorization"), None);
        assert_eq!(
            serde_json::from_slice::<serde_json::Value>(sent.body.as_deref().unwrap()).unwrap(),
            json!({"refresh_token": "old-refresh"})
        );
    }

    #[tokio::test]
    async fn test_missing_rotated_refresh_token_keeps_previous() {
        let f = fixture(MockTransport::new(|_| {
            Ok(RawResponse::json(200, &json!({"access_token": "new-access"})))
        }));
        f.coordinator
            .recover(&f.executor, Some("old-access"))
            .await
            .unwrap();
        assert_eq!(
            f.tokens.snapshot().await,
            Some(TokenPair::new("new-access", "old-refresh"))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_recoveries_share_one_refresh() {
        let f = fixture(refresh_ok().with_delay(REFRESH_PATH, Duration::from_millis(50)));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let coordinator = f.coordinator.clone();
            let executor = f.executor.clone();
            handles.push(tokio::spawn(async move {
                coordinator.recover(&executor, Some("old-access")).await
            }));
        }
        for handle in handles {
            assert_eq!(
                handle.await.unwrap().unwrap(),
                Recovery::Retry(TokenPair::new("new-access", "new-refresh"))
            );
        }
        assert_eq!(f.transport.count(REFRESH_PATH), 1);
    }

    #[tokio::test]
    async fn test_superseded_token_skips_refresh() {
        let f = fixture(refresh_ok());
        f.tokens.set_tokens("fresh-access", "fresh-refresh").await;

        let outcome = f
            .coordinator
            .recover(&f.executor, Some("old-access"))
            .await
            .unwrap();
        assert_eq!(
            outcome,
            Recovery::Retry(TokenPair::new("fresh-access", "fresh-refresh"))
        );
        assert_eq!(f.transport.count(REFRESH_PATH), 0);
    }

    #[tokio::test]
    async fn test_no_refresh_token_is_unavailable() {
        let f = fixture(refresh_ok());
        f.tokens.set_tokens("old-access", "").await;
        let outcome = f
            .coordinator
            .recover(&f.executor, Some("old-access"))
            .await
            .unwrap();
        assert_eq!(outcome, Recovery::Unavailable);
        assert_eq!(f.transport.count(REFRESH_PATH), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_refresh_rejects_all_and_redirects_once() {
        let f = fixture(
            MockTransport::new(|_| {
                Ok(RawResponse::json(401, &json!({"detail": "Invalid refresh token"})))
            })
            .with_delay(REFRESH_PATH, Duration::from_millis(50)),
        );
        f.sessions.save_session_id("sid-1").await.unwrap();
        f.sessions
            .save_filters(&json!({"fullName": "Петров"}))
            .await
            .unwrap();

        let mut handles = Vec::new();
        for _ in 0..4 {
            let coordinator = f.coordinator.clone();
            let executor = f.executor.clone();
            handles.push(tokio::spawn(async move {
                coordinator.recover(&executor, Some("old-access")).await
            }));
        }
        for handle in handles {
            let err = handle.await.unwrap().unwrap_err();
            assert_eq!(err.message(), "Invalid refresh token");
            assert!(err.is_unauthorized());
        }

        assert_eq!(f.transport.count(REFRESH_PATH), 1);
        assert_eq!(f.tokens.snapshot().await, None);
        assert_eq!(f.sessions.tokens(), None);
        assert_eq!(f.sessions.load_session_id().await.unwrap(), None);
        assert_eq!(f.sessions.load_filters().await.unwrap(), None);
        assert_eq!(f.navigator.routes(), vec![LOGIN_ROUTE.to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_leader_releases_waiters() {
        let f = fixture(refresh_ok().with_delay(REFRESH_PATH, Duration::from_secs(10)));

        let leader = {
            let coordinator = f.coordinator.clone();
            let executor = f.executor.clone();
            tokio::spawn(async move { coordinator.recover(&executor, Some("old-access")).await })
        };
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert!(f.coordinator.is_refreshing());

        let follower = {
            let coordinator = f.coordinator.clone();
            let executor = f.executor.clone();
            tokio::spawn(async move { coordinator.recover(&executor, Some("old-access")).await })
        };
        tokio::time::sleep(Duration::from_millis(1)).await;

        leader.abort();
        let err = follower.await.unwrap().unwrap_err();
        assert_eq!(err, ApiError::refresh_aborted());
        assert!(!f.coordinator.is_refreshing());
    }
}
