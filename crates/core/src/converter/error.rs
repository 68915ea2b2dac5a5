//! Error types for the converter module.

use thiserror::Error;

/// Errors that can occur during a remote conversion.
#[derive(Debug, Error)]
pub enum ConverterError {
    /// The request could not be sent or the response could not be read.
    #[error("Conversion request failed: {reason}")]
    Transport { reason: String },

    /// The request timed out.
    #[error("Conversion timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// The service answered with a non-success status.
    #[error("Conversion rejected with HTTP {status}: {message}")]
    Rejected { status: u16, message: String },

    /// Failed to build the HTTP client.
    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

impl ConverterError {
    /// Creates a new transport error.
    pub fn transport(reason: impl Into<String>) -> Self {
        Self::Transport {
            reason: reason.into(),
        }
    }

    /// Creates a new rejected error.
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            message: message.into(),
        }
    }
}
