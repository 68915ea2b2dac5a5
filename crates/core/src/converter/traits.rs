//! Trait definitions for the converter module.

use async_trait::async_trait;

use super::error::ConverterError;
use super::types::{ConversionOutput, ConversionRequest};

/// A converter that turns a file into another format.
#[async_trait]
pub trait Converter: Send + Sync {
    /// Returns the name of this converter implementation.
    fn name(&self) -> &str;

    /// Converts one file. Exactly one attempt is made.
    async fn convert(&self, request: ConversionRequest)
        -> Result<ConversionOutput, ConverterError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::FormatFamily;

    struct UppercaseConverter;

    #[async_trait]
    impl Converter for UppercaseConverter {
        fn name(&self) -> &str {
            "uppercase"
        }

        async fn convert(
            &self,
            request: ConversionRequest,
        ) -> Result<ConversionOutput, ConverterError> {
            Ok(ConversionOutput::new(request.bytes.to_ascii_uppercase()))
        }
    }

    #[tokio::test]
    async fn test_converter_trait_object() {
        let converter: Box<dyn Converter> = Box::new(UppercaseConverter);
        let output = converter
            .convert(ConversionRequest {
                family: FormatFamily::Document,
                file_name: "a.txt".to_string(),
                bytes: b"hello".to_vec().into(),
                output_format: "pdf".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(output.bytes, b"HELLO");
        assert_eq!(converter.name(), "uppercase");
    }

    #[test]
    fn test_converter_from_sync_context() {
        let converter = UppercaseConverter;
        let result = tokio_test::block_on(converter.convert(ConversionRequest {
            family: FormatFamily::Image,
            file_name: "b.png".to_string(),
            bytes: b"png".to_vec().into(),
            output_format: "jpeg".to_string(),
        }));
        assert_eq!(result.unwrap().bytes, b"PNG");
    }
}
