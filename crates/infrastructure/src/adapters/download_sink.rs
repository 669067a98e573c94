//! Saves downloaded documents into a directory.

use std::path::PathBuf;

use async_trait::async_trait;
use medhist_application::ports::{FileSink, FileSinkError};
use tokio::fs;
use tracing::debug;

/// File sink that writes into one download directory.
#[derive(Debug, Clone)]
pub struct DownloadDirSink {
    dir: PathBuf,
}

impl DownloadDirSink {
    /// Creates a sink writing into `dir`; the directory is created on first use.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The user's download directory, or the working directory if the
    /// platform has none.
    #[must_use]
    pub fn default_dir() -> PathBuf {
        dirs::download_dir().unwrap_or_else(|| PathBuf::from("."))
    }
}

fn validate_filename(filename: &str) -> Result<(), FileSinkError> {
    let invalid = filename.trim().is_empty()
        || filename == "."
        || filename == ".."
        || filename.contains(['/', '\\', '\0']);
    if invalid {
        return Err(FileSinkError::InvalidFilename(filename.to_string()));
    }
    Ok(())
}

#[async_trait]
impl FileSink for DownloadDirSink {
    async fn save(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf, FileSinkError> {
        validate_filename(filename)?;
        fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(filename);
        fs::write(&path, bytes).await?;
        debug!(path = %path.display(), bytes = bytes.len(), "file written");
        Ok(path)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_writes_exact_bytes() {
        let temp = TempDir::new().unwrap();
        let sink = DownloadDirSink::new(temp.path().join("reports"));

        let path = sink
            .save("История_болезни_7.docx", b"\x00\x01docx")
            .await
            .unwrap();
        assert_eq!(path, temp.path().join("reports/История_болезни_7.docx"));
        assert_eq!(std::fs::read(&path).unwrap(), b"\x00\x01docx".to_vec());
    }

    #[tokio::test]
    async fn test_rejects_path_escapes() {
        let temp = TempDir::new().unwrap();
        let sink = DownloadDirSink::new(temp.path());
        for name in ["", "..", "../evil.xlsx", "a/b.xlsx", "a\\b.xlsx"] {
            assert!(matches!(
                sink.save(name, b"x").await,
                Err(FileSinkError::InvalidFilename(_))
            ));
        }
    }
}
