//! Download target port

use std::path::PathBuf;

use async_trait::async_trait;

/// Errors raised while saving a downloaded file.
#[derive(Debug, thiserror::Error)]
pub enum FileSinkError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file name would escape the download location.
    #[error("invalid file name: {0}")]
    InvalidFilename(String),
}

/// Port for delivering a downloaded document to the user.
#[async_trait]
pub trait FileSink: Send + Sync {
    /// Saves `bytes` under `filename` and returns where it landed.
    async fn save(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf, FileSinkError>;
}
