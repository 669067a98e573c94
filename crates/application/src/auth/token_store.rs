//! In-memory token storage for one client session.
//!
//! Holds the access/refresh pair behind a single lock so readers always
//! observe a complete pair.

use std::sync::Arc;

use medhist_domain::TokenPair;
use tokio::sync::RwLock;

/// Thread-safe in-memory token store.
#[derive(Debug, Clone, Default)]
pub struct TokenStore {
    tokens: Arc<RwLock<Option<TokenPair>>>,
}

impl TokenStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds `tokens`.
    #[must_use]
    pub fn with_tokens(tokens: TokenPair) -> Self {
        Self {
            tokens: Arc::new(RwLock::new(Some(tokens))),
        }
    }

    /// Overwrite both tokens.
    pub async fn set_tokens(&self, access_token: impl Into<String>, refresh_token: impl Into<String>) {
        self.set(TokenPair::new(access_token, refresh_token)).await;
    }

    /// Overwrite both tokens with an existing pair.
    pub async fn set(&self, tokens: TokenPair) {
        *self.tokens.write().await = Some(tokens);
    }

    /// Forget both tokens. Clearing an empty store is a no-op.
    pub async fn clear_tokens(&self) {
        *self.tokens.write().await = None;
    }

    /// Get the current pair, if any.
    pub async fn snapshot(&self) -> Option<TokenPair> {
        self.tokens.read().await.clone()
    }

    /// Get the current access token.
    pub async fn access_token(&self) -> Option<String> {
        self.tokens
            .read()
            .await
            .as_ref()
            .map(|t| t.access_token.clone())
    }

    /// Get the current refresh token.
    pub async fn refresh_token(&self) -> Option<String> {
        self.tokens
            .read()
            .await
            .as_ref()
            .map(|t| t.refresh_token.clone())
    }

    /// Returns true if an access token is held.
    pub async fn is_authenticated(&self) -> bool {
        self.tokens
            .read()
            .await
            .as_ref()
            .is_some_and(|t| !t.access_token.is_empty())
    }
}
