//! Format catalog: which output formats are reachable from a file extension.
//!
//! Discovery never blocks the session. [`FormatCatalog::lookup`] turns every
//! failure into an empty format list and logs it, so an unreachable catalog
//! degrades to "no formats available" for the affected file.

mod http;

pub use http::HttpFormatCatalog;

use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

use crate::metrics;

/// Errors that can occur when querying the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// The catalog answered with a non-success status.
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

/// Source of the formats reachable from an extension.
#[async_trait]
pub trait FormatCatalog: Send + Sync {
    /// Returns the name of this catalog implementation.
    fn name(&self) -> &str;

    /// Query the catalog once. No retries.
    async fn fetch_formats(&self, extension: &str) -> Result<Vec<String>, CatalogError>;

    /// Formats reachable from `extension`, or an empty list on any failure.
    ///
    /// An empty extension is never sent to the catalog.
    async fn lookup(&self, extension: &str) -> Vec<String> {
        if extension.is_empty() {
            metrics::DISCOVERIES_TOTAL
                .with_label_values(&["unsupported"])
                .inc();
            return Vec::new();
        }

        match self.fetch_formats(extension).await {
            Ok(formats) => {
                let result = if formats.is_empty() {
                    "unsupported"
                } else {
                    "formats"
                };
                metrics::DISCOVERIES_TOTAL.with_label_values(&[result]).inc();
                formats
            }
            Err(e) => {
                warn!(
                    catalog = self.name(),
                    extension, "Format lookup failed, treating as unsupported: {}", e
                );
                metrics::DISCOVERIES_TOTAL.with_label_values(&["failed"]).inc();
                Vec::new()
            }
        }
    }
}
