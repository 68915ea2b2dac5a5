//! Artifact exporter.
//!
//! Hands the result of a finished conversion to an [`ArtifactSink`] under its
//! derived filename. Exporting never changes conversion state and can be
//! repeated.

mod error;
mod sink;

pub use error::ExportError;
pub use sink::{ArtifactSink, FsArtifactSink};

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::metrics;
use crate::session::{EntryId, SessionStore};

/// Record of one export.
#[derive(Debug, Clone, Serialize)]
pub struct ExportReceipt {
    pub id: EntryId,
    pub filename: String,
    /// Where the sink put the bytes.
    pub location: String,
    pub size_bytes: u64,
    /// Hex-encoded SHA-256 of the exported bytes.
    pub sha256: String,
    pub exported_at: DateTime<Utc>,
}

/// Exports artifacts from a session store to a sink.
#[derive(Clone)]
pub struct ArtifactExporter {
    store: Arc<SessionStore>,
    sink: Arc<dyn ArtifactSink>,
}

impl ArtifactExporter {
    pub fn new(store: Arc<SessionStore>, sink: Arc<dyn ArtifactSink>) -> Self {
        Self { store, sink }
    }

    /// Export the result of one entry.
    ///
    /// Returns `Ok(None)` when the entry does not exist or has no result.
    pub async fn export(&self, id: EntryId) -> Result<Option<ExportReceipt>, ExportError> {
        let Some(artifact) = self.store.artifact(id).await else {
            metrics::EXPORTS_TOTAL.with_label_values(&["no_result"]).inc();
            return Ok(None);
        };

        let location = match self.sink.save(artifact.filename(), artifact.bytes()).await {
            Ok(location) => location,
            Err(e) => {
                warn!(entry = %id, sink = self.sink.name(), "Export failed: {}", e);
                metrics::EXPORTS_TOTAL.with_label_values(&["failed"]).inc();
                return Err(e);
            }
        };

        let sha256 = format!("{:x}", Sha256::digest(artifact.bytes()));
        metrics::EXPORTS_TOTAL.with_label_values(&["success"]).inc();
        info!(entry = %id, "Exported {} to {}", artifact.filename(), location);

        Ok(Some(ExportReceipt {
            id,
            filename: artifact.filename().to_string(),
            location,
            size_bytes: artifact.size(),
            sha256,
            exported_at: Utc::now(),
        }))
    }
}
