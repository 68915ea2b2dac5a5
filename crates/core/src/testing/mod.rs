//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of the remote service traits,
//! allowing session and API tests to run without a conversion service.
//!
//! # Example
//!
//! ```rust,ignore
//! use convertino_core::testing::{MockConverter, MockFormatCatalog};
//!
//! let catalog = MockFormatCatalog::new();
//! let converter = MockConverter::new();
//!
//! // Configure mock responses
//! catalog.set_formats("docx", &["pdf"]).await;
//! converter.fail_file("broken.docx").await;
//!
//! // Use in a ConversionOrchestrator...
//! ```

mod mock_artifact_sink;
mod mock_converter;
mod mock_format_catalog;

pub use mock_artifact_sink::MockArtifactSink;
pub use mock_converter::{MockConverter, RecordedConversion};
pub use mock_format_catalog::MockFormatCatalog;

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::session::FileSource;

    /// Create a file whose contents are its own name.
    pub fn file_source(name: &str) -> FileSource {
        FileSource::new(name, name.as_bytes().to_vec())
    }

    /// A small Word document.
    pub fn report_docx() -> FileSource {
        FileSource::new("report.docx", b"PK\x03\x04word/document.xml".to_vec())
    }

    /// A small PNG image.
    pub fn photo_png() -> FileSource {
        FileSource::new("photo.png", b"\x89PNG\r\n\x1a\n".to_vec())
    }

    /// Formats the service offers for `.docx`.
    pub const DOCX_FORMATS: &[&str] = &["pdf"];

    /// Formats the service offers for `.png`.
    pub const PNG_FORMATS: &[&str] = &["jpeg", "bmp", "gif", "tiff"];
}
