//! Session persistence port
//!
//! Tokens, the filter-session id and saved filters survive restarts of the
//! client. Keeping them is the caller's concern; the token store itself is
//! in-memory only.

use async_trait::async_trait;
use medhist_domain::TokenPair;

/// Errors that can occur while reading or writing persisted session state.
#[derive(Debug, thiserror::Error)]
pub enum SessionStoreError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// No location to persist to.
    #[error("Could not determine session directory")]
    NoSessionDir,
}

/// Repository trait for persisted session state.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Loads the saved token pair, if both tokens are present.
    async fn load_tokens(&self) -> Result<Option<TokenPair>, SessionStoreError>;

    /// Saves the token pair, replacing any previous one.
    async fn save_tokens(&self, tokens: &TokenPair) -> Result<(), SessionStoreError>;

    /// Removes saved tokens only.
    async fn clear_tokens(&self) -> Result<(), SessionStoreError>;

    /// Loads the filter-session id.
    async fn load_session_id(&self) -> Result<Option<String>, SessionStoreError>;

    /// Saves the filter-session id.
    async fn save_session_id(&self, session_id: &str) -> Result<(), SessionStoreError>;

    /// Loads the saved filter blob.
    async fn load_filters(&self) -> Result<Option<serde_json::Value>, SessionStoreError>;

    /// Saves the filter blob.
    async fn save_filters(&self, filters: &serde_json::Value) -> Result<(), SessionStoreError>;

    /// Removes everything: tokens, session id and filters.
    async fn clear(&self) -> Result<(), SessionStoreError>;
}
