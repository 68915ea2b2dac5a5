//! Output format families and file naming.
//!
//! Every output format the remote service can produce belongs to exactly one
//! family, and the family decides which conversion endpoint receives the file.
//! A format outside both families is a contract violation and is reported as
//! [`FormatError::Unroutable`] instead of being guessed at.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Formats handled by the document conversion endpoint.
pub const DOCUMENT_FORMATS: &[&str] = &["pdf", "doc", "docx", "odt"];

/// Formats handled by the image conversion endpoint.
pub const IMAGE_FORMATS: &[&str] = &["jpeg", "png", "bmp", "gif", "tiff"];

/// Errors raised while classifying an output format.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// The format belongs to neither the document nor the image family.
    #[error("output format '{format}' has no conversion endpoint")]
    Unroutable { format: String },
}

/// Family of an output format, used to pick the conversion endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatFamily {
    /// Office documents (pdf, doc, docx, odt).
    Document,
    /// Raster images (jpeg, png, bmp, gif, tiff).
    Image,
}

impl FormatFamily {
    /// Classifies an output format. Matching ignores ASCII case.
    pub fn classify(format: &str) -> Result<Self, FormatError> {
        let format = format.trim().to_ascii_lowercase();
        if DOCUMENT_FORMATS.contains(&format.as_str()) {
            Ok(Self::Document)
        } else if IMAGE_FORMATS.contains(&format.as_str()) {
            Ok(Self::Image)
        } else {
            Err(FormatError::Unroutable { format })
        }
    }

    /// Path of the conversion endpoint, relative to the service base URL.
    pub fn endpoint_path(&self) -> &'static str {
        match self {
            Self::Document => "convert_word_file",
            Self::Image => "convert_image_file",
        }
    }

    /// Formats belonging to this family.
    pub fn formats(&self) -> &'static [&'static str] {
        match self {
            Self::Document => DOCUMENT_FORMATS,
            Self::Image => IMAGE_FORMATS,
        }
    }

    /// Label used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::Image => "image",
        }
    }
}

impl std::fmt::Display for FormatFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

const PATH_SEPARATORS: [char; 2] = ['/', '\\'];

/// Splits `name` into stem and extension at the last dot of its final path
/// component.
///
/// Names without a dot, with a leading dot only (`.bashrc`) or with a
/// trailing dot have no extension. Dots in directory names never count.
fn split_extension(name: &str) -> Option<(&str, &str)> {
    let (stem, ext) = name.rsplit_once('.')?;
    if ext.is_empty() || ext.contains(PATH_SEPARATORS) {
        return None;
    }

    let base = stem.rsplit(PATH_SEPARATORS).next().unwrap_or(stem);
    if base.is_empty() {
        return None;
    }
    Some((stem, ext))
}

/// Lower-cased extension of a file name, or an empty string if it has none.
pub fn extension_of(name: &str) -> String {
    split_extension(name)
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default()
}

/// Name of the converted file: the final extension replaced by `format`.
pub fn output_filename(name: &str, format: &str) -> String {
    match split_extension(name) {
        Some((stem, _)) => format!("{}.{}", stem, format),
        None => format!("{}.{}", name, format),
    }
}
