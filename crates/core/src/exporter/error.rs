//! Error types for the exporter module.

use thiserror::Error;

/// Errors that can occur while exporting an artifact.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Filesystem operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The artifact filename has no usable final component.
    #[error("invalid artifact filename: {0:?}")]
    InvalidFilename(String),

    /// A non-filesystem sink rejected the artifact.
    #[error("sink error: {0}")]
    Sink(String),
}
