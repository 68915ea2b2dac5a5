//! Converter module for remote file conversion.
//!
//! This module provides the `Converter` trait and an HTTP implementation that
//! submits files to the remote conversion service. The endpoint is chosen by
//! the family of the requested output format:
//!
//! - Documents (pdf, doc, docx, odt) go to `convert_word_file`
//! - Images (jpeg, png, bmp, gif, tiff) go to `convert_image_file`
//!
//! # Example
//!
//! ```ignore
//! use convertino_core::converter::{Converter, ConversionRequest, HttpConverter};
//! use convertino_core::config::RemoteConfig;
//! use convertino_core::format::FormatFamily;
//!
//! let converter = HttpConverter::new(&RemoteConfig::new("http://localhost:8000"))?;
//!
//! let output = converter.convert(ConversionRequest {
//!     family: FormatFamily::Document,
//!     file_name: "report.docx".to_string(),
//!     bytes: std::fs::read("report.docx")?.into(),
//!     output_format: "pdf".to_string(),
//! }).await?;
//! std::fs::write("report.pdf", &output.bytes)?;
//! ```

mod error;
mod http;
mod traits;
mod types;

pub use error::ConverterError;
pub use http::HttpConverter;
pub use traits::Converter;
pub use types::{ConversionOutput, ConversionRequest};
