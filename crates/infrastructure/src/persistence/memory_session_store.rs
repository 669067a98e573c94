//! In-process session store.

use async_trait::async_trait;
use medhist_application::ports::{SessionStore, SessionStoreError};
use medhist_domain::TokenPair;
use parking_lot::Mutex;

use super::file_session_store::SessionDocument;

/// [`SessionStore`] that forgets everything when the process exits.
///
/// Used when no session file is configured.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    document: Mutex<SessionDocument>,
}

impl InMemorySessionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load_tokens(&self) -> Result<Option<TokenPair>, SessionStoreError> {
        Ok(self.document.lock().tokens())
    }

    async fn save_tokens(&self, tokens: &TokenPair) -> Result<(), SessionStoreError> {
        self.document.lock().set_tokens(Some(tokens));
        Ok(())
    }

    async fn clear_tokens(&self) -> Result<(), SessionStoreError> {
        self.document.lock().set_tokens(None);
        Ok(())
    }

    async fn load_session_id(&self) -> Result<Option<String>, SessionStoreError> {
        Ok(self.document.lock().session_id.clone())
    }

    async fn save_session_id(&self, session_id: &str) -> Result<(), SessionStoreError> {
        self.document.lock().session_id = Some(session_id.to_string());
        Ok(())
    }

    async fn load_filters(&self) -> Result<Option<serde_json::Value>, SessionStoreError> {
        Ok(self.document.lock().filters.clone())
    }

    async fn save_filters(&self, filters: &serde_json::Value) -> Result<(), SessionStoreError> {
        self.document.lock().filters = Some(filters.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), SessionStoreError> {
        *self.document.lock() = SessionDocument::default();
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_empty_tokens_are_not_loaded() {
        let store = InMemorySessionStore::new();
        store.save_tokens(&TokenPair::new("a1", "")).await.unwrap();
        assert_eq!(store.load_tokens().await.unwrap(), None);

        store.save_tokens(&TokenPair::new("a1", "r1")).await.unwrap();
        assert_eq!(
            store.load_tokens().await.unwrap(),
            Some(TokenPair::new("a1", "r1"))
        );
    }

    #[tokio::test]
    async fn test_clear_tokens_keeps_session() {
        let store = InMemorySessionStore::new();
        store.save_tokens(&TokenPair::new("a1", "r1")).await.unwrap();
        store.save_session_id("sid").await.unwrap();

        store.clear_tokens().await.unwrap();
        assert_eq!(store.load_tokens().await.unwrap(), None);
        assert_eq!(store.load_session_id().await.unwrap().as_deref(), Some("sid"));

        store.clear().await.unwrap();
        assert_eq!(store.load_session_id().await.unwrap(), None);
    }
}
