//! Mock artifact sink for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::exporter::{ArtifactSink, ExportError};

/// Mock implementation of the ArtifactSink trait.
///
/// Keeps saved artifacts in memory and reports `mock://{filename}` as their
/// location.
#[derive(Debug, Default)]
pub struct MockArtifactSink {
    /// Saved (filename, bytes) pairs, in order.
    saved: Arc<RwLock<Vec<(String, Vec<u8>)>>>,
    /// If set, the next save will fail with this error.
    next_error: Arc<RwLock<Option<ExportError>>>,
}

impl MockArtifactSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get everything saved so far.
    pub async fn saved(&self) -> Vec<(String, Vec<u8>)> {
        self.saved.read().await.clone()
    }

    /// Configure the next save to fail with the given error.
    pub async fn set_next_error(&self, error: ExportError) {
        *self.next_error.write().await = Some(error);
    }
}

#[async_trait]
impl ArtifactSink for MockArtifactSink {
    fn name(&self) -> &str {
        "mock"
    }

    async fn save(&self, filename: &str, bytes: &[u8]) -> Result<String, ExportError> {
        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }

        self.saved
            .write()
            .await
            .push((filename.to_string(), bytes.to_vec()));
        Ok(format!("mock://{}", filename))
    }
}
