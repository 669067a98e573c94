//! Session persistence in a JSON file.
//!
//! By default the file lives in the platform-specific config directory:
//! - Linux: ~/.config/medhist/session.json
//! - macOS: ~/Library/Application Support/medhist/session.json
//! - Windows: %APPDATA%/medhist/session.json

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use medhist_application::ports::{SessionStore, SessionStoreError};
use medhist_domain::TokenPair;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::warn;

use crate::serialization::{SerializationError, from_json_bytes, to_json_stable_bytes};

/// Everything a session keeps between runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub(crate) struct SessionDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<serde_json::Value>,
}

impl SessionDocument {
    pub(crate) fn tokens(&self) -> Option<TokenPair> {
        match (&self.access_token, &self.refresh_token) {
            (Some(access), Some(refresh)) if !access.is_empty() && !refresh.is_empty() => {
                Some(TokenPair::new(access.as_str(), refresh.as_str()))
            }
            _ => None,
        }
    }

    pub(crate) fn set_tokens(&mut self, tokens: Option<&TokenPair>) {
        self.access_token = tokens.map(|t| t.access_token.clone());
        self.refresh_token = tokens.map(|t| t.refresh_token.clone());
    }
}

fn serialization_error(err: SerializationError) -> SessionStoreError {
    SessionStoreError::Serialization(err.to_string())
}

/// File-backed [`SessionStore`].
///
/// Read-modify-write cycles are serialized within the process. Loads of a
/// corrupt file fail; the next save replaces it.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileSessionStore {
    /// Creates a store backed by `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Creates a store at the default location.
    ///
    /// # Errors
    ///
    /// Returns `NoSessionDir` if the platform has no config directory.
    pub fn at_default_location() -> Result<Self, SessionStoreError> {
        Self::default_path()
            .map(Self::new)
            .ok_or(SessionStoreError::NoSessionDir)
    }

    /// Returns the default session file path, if available.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("medhist").join("session.json"))
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<SessionDocument, SessionStoreError> {
        match fs::read(&self.path).await {
            Ok(content) => from_json_bytes(&content).map_err(serialization_error),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(SessionDocument::default()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, document: &SessionDocument) -> Result<(), SessionStoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let content = to_json_stable_bytes(document).map_err(serialization_error)?;
        // Write beside the target and rename so readers never see half a file.
        let staged = self.path.with_extension("json.tmp");
        fs::write(&staged, content).await?;
        fs::rename(&staged, &self.path).await?;
        Ok(())
    }

    async fn update(
        &self,
        change: impl FnOnce(&mut SessionDocument) + Send,
    ) -> Result<(), SessionStoreError> {
        let _guard = self.lock.lock().await;
        let mut document = match self.read().await {
            Ok(document) => document,
            Err(SessionStoreError::Serialization(reason)) => {
                warn!(path = %self.path.display(), %reason, "session file is corrupt, starting over");
                SessionDocument::default()
            }
            Err(e) => return Err(e),
        };
        change(&mut document);
        self.write(&document).await
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load_tokens(&self) -> Result<Option<TokenPair>, SessionStoreError> {
        Ok(self.read().await?.tokens())
    }

    async fn save_tokens(&self, tokens: &TokenPair) -> Result<(), SessionStoreError> {
        self.update(|doc| doc.set_tokens(Some(tokens))).await
    }

    async fn clear_tokens(&self) -> Result<(), SessionStoreError> {
        self.update(|doc| doc.set_tokens(None)).await
    }

    async fn load_session_id(&self) -> Result<Option<String>, SessionStoreError> {
        Ok(self.read().await?.session_id)
    }

    async fn save_session_id(&self, session_id: &str) -> Result<(), SessionStoreError> {
        self.update(|doc| doc.session_id = Some(session_id.to_string()))
            .await
    }

    async fn load_filters(&self) -> Result<Option<serde_json::Value>, SessionStoreError> {
        Ok(self.read().await?.filters)
    }

    async fn save_filters(&self, filters: &serde_json::Value) -> Result<(), SessionStoreError> {
        self.update(|doc| doc.filters = Some(filters.clone())).await
    }

    async fn clear(&self) -> Result<(), SessionStoreError> {
        let _guard = self.lock.lock().await;
        match fs::remove_file(&self.path).await {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::TempDir;

    fn store(temp: &TempDir) -> FileSessionStore {
        FileSessionStore::new(temp.path().join("nested").join("session.json"))
    }

    #[test]
    fn test_default_path_shape() {
        if let Some(path) = FileSessionStore::default_path() {
            assert!(path.ends_with("medhist/session.json"));
        }
    }

    #[tokio::test]
    async fn test_missing_file_is_empty_session() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        assert_eq!(store.load_tokens().await.unwrap(), None);
        assert_eq!(store.load_session_id().await.unwrap(), None);
        assert_eq!(store.load_filters().await.unwrap(), None);
        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn test_fields_are_updated_independently() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);

        store.save_tokens(&TokenPair::new("a1", "r1")).await.unwrap();
        store.save_session_id("sid").await.unwrap();
        store
            .save_filters(&json!({"fullName": "", "startDate": "2024-01-01", "endDate": "2024-01-31"}))
            .await
            .unwrap();
        store.clear_tokens().await.unwrap();

        let reopened = FileSessionStore::new(store.path());
        assert_eq!(reopened.load_tokens().await.unwrap(), None);
        assert_eq!(reopened.load_session_id().await.unwrap().as_deref(), Some("sid"));
        assert_eq!(
            reopened.load_filters().await.unwrap().unwrap()["startDate"],
            "2024-01-01"
        );
    }

    #[tokio::test]
    async fn test_clear_removes_everything() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        store.save_tokens(&TokenPair::new("a1", "r1")).await.unwrap();
        assert_eq!(
            store.load_tokens().await.unwrap(),
            Some(TokenPair::new("a1", "r1"))
        );

        store.clear().await.unwrap();
        assert!(!store.path().exists());
        assert_eq!(store.load_tokens().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_file_is_readable_json() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        store.save_session_id("sid").await.unwrap();
        let text = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(text, "{\n  \"session_id\": \"sid\"\n}\n");
    }

    #[tokio::test]
    async fn test_corrupt_file_fails_loads_until_next_save() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(store.path(), "{oops").unwrap();
        assert!(matches!(
            store.load_tokens().await,
            Err(SessionStoreError::Serialization(_))
        ));

        store.save_tokens(&TokenPair::new("a2", "r2")).await.unwrap();
        assert_eq!(
            store.load_tokens().await.unwrap(),
            Some(TokenPair::new("a2", "r2"))
        );
        assert_eq!(store.load_session_id().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_save_leaves_no_staging_file() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        store.save_tokens(&TokenPair::new("a1", "r1")).await.unwrap();
        store.save_session_id("sid").await.unwrap();

        let names: Vec<String> = std::fs::read_dir(store.path().parent().unwrap())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["session.json".to_string()]);
    }
}
