//! Destinations for exported artifacts.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use super::error::ExportError;

/// Where exported artifacts are written.
#[async_trait]
pub trait ArtifactSink: Send + Sync {
    /// Returns the name of this sink implementation.
    fn name(&self) -> &str;

    /// Store `bytes` under `filename` and return where they ended up.
    ///
    /// Saving the same filename again overwrites the previous copy.
    async fn save(&self, filename: &str, bytes: &[u8]) -> Result<String, ExportError>;
}

/// Writes artifacts into a directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct FsArtifactSink {
    output_dir: PathBuf,
}

impl FsArtifactSink {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Target path for `filename`. Only the final path component is kept,
    /// so the result always lies inside the output directory.
    pub fn target_path(&self, filename: &str) -> Result<PathBuf, ExportError> {
        let base = Path::new(filename)
            .file_name()
            .and_then(|name| name.to_str())
            .filter(|name| !name.is_empty())
            .ok_or_else(|| ExportError::InvalidFilename(filename.to_string()))?;
        Ok(self.output_dir.join(base))
    }
}

#[async_trait]
impl ArtifactSink for FsArtifactSink {
    fn name(&self) -> &str {
        "filesystem"
    }

    async fn save(&self, filename: &str, bytes: &[u8]) -> Result<String, ExportError> {
        let path = self.target_path(filename)?;
        tokio::fs::create_dir_all(&self.output_dir).await?;
        tokio::fs::write(&path, bytes).await?;
        debug!("Wrote {} bytes to {}", bytes.len(), path.display());
        Ok(path.display().to_string())
    }
}
