//! Types for the converter module.

use std::sync::Arc;

use crate::format::FormatFamily;

/// A single conversion request sent to the remote service.
#[derive(Debug, Clone)]
pub struct ConversionRequest {
    /// Family of the output format; selects the endpoint.
    pub family: FormatFamily,
    /// Original file name, sent as the multipart file name.
    pub file_name: String,
    /// Original file contents.
    pub bytes: Arc<[u8]>,
    /// Target format identifier.
    pub output_format: String,
}

/// Converted file contents returned by the remote service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionOutput {
    pub bytes: Vec<u8>,
    /// Content type reported by the service, if any.
    pub content_type: Option<String>,
}

impl ConversionOutput {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
            content_type: None,
        }
    }
}
