//! Mock converter for testing.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, RwLock};

use crate::converter::{ConversionOutput, ConversionRequest, Converter, ConverterError};
use crate::format::FormatFamily;

/// A recorded conversion request for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedConversion {
    pub family: FormatFamily,
    pub file_name: String,
    pub output_format: String,
    pub size_bytes: usize,
}

/// Mock implementation of the Converter trait.
///
/// Provides controllable behavior for testing:
/// - Track conversion requests for assertions
/// - Simulate failures per file name
/// - Hold conversions per file name until released
///
/// A successful conversion returns the bytes `"{file_name}->{output_format}"`.
///
/// # Example
///
/// ```rust,ignore
/// use convertino_core::testing::MockConverter;
///
/// let converter = MockConverter::new();
/// converter.fail_file("broken.docx").await;
///
/// // ... run conversions ...
///
/// assert_eq!(converter.conversion_count().await, 2);
/// ```
#[derive(Debug, Default)]
pub struct MockConverter {
    /// Recorded requests.
    requests: Arc<RwLock<Vec<RecordedConversion>>>,
    /// File names whose conversion is rejected.
    failing: Arc<RwLock<HashSet<String>>>,
    /// File names whose conversion waits for a release.
    holds: Arc<RwLock<HashMap<String, Arc<Notify>>>>,
    /// Simulated conversion duration.
    delay: Arc<RwLock<Option<Duration>>>,
}

impl MockConverter {
    /// Create a new mock converter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject conversions of the given file.
    pub async fn fail_file(&self, file_name: &str) {
        self.failing.write().await.insert(file_name.to_string());
    }

    /// Make conversions of the given file wait until [`Self::release_file`].
    pub async fn hold_file(&self, file_name: &str) {
        self.holds
            .write()
            .await
            .insert(file_name.to_string(), Arc::new(Notify::new()));
    }

    /// Let one held conversion of the given file complete.
    pub async fn release_file(&self, file_name: &str) {
        if let Some(gate) = self.holds.read().await.get(file_name) {
            gate.notify_one();
        }
    }

    /// Set the simulated conversion duration.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = Some(delay);
    }

    /// Get all recorded requests.
    pub async fn recorded_requests(&self) -> Vec<RecordedConversion> {
        self.requests.read().await.clone()
    }

    /// Get the number of conversions requested.
    pub async fn conversion_count(&self) -> usize {
        self.requests.read().await.len()
    }

    /// Wait until at least `count` requests have been received.
    pub async fn wait_for_requests(&self, count: usize) {
        while self.requests.read().await.len() < count {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }
}

#[async_trait]
impl Converter for MockConverter {
    fn name(&self) -> &str {
        "mock"
    }

    async fn convert(
        &self,
        request: ConversionRequest,
    ) -> Result<ConversionOutput, ConverterError> {
        self.requests.write().await.push(RecordedConversion {
            family: request.family,
            file_name: request.file_name.clone(),
            output_format: request.output_format.clone(),
            size_bytes: request.bytes.len(),
        });

        let gate = self.holds.read().await.get(&request.file_name).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let delay = *self.delay.read().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.failing.read().await.contains(&request.file_name) {
            return Err(ConverterError::rejected(500, "mock conversion failure"));
        }

        Ok(ConversionOutput::new(
            format!("{}->{}", request.file_name, request.output_format).into_bytes(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str, format: &str) -> ConversionRequest {
        ConversionRequest {
            family: FormatFamily::classify(format).unwrap(),
            file_name: name.to_string(),
            bytes: name.as_bytes().to_vec().into(),
            output_format: format.to_string(),
        }
    }

    #[tokio::test]
    async fn test_successful_conversion_is_recorded() {
        let converter = MockConverter::new();
        let output = converter.convert(request("a.docx", "pdf")).await.unwrap();

        assert_eq!(output.bytes, b"a.docx->pdf");
        let recorded = converter.recorded_requests().await;
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].family, FormatFamily::Document);
        assert_eq!(recorded[0].size_bytes, 6);
    }

    #[tokio::test]
    async fn test_failing_file() {
        let converter = MockConverter::new();
        converter.fail_file("a.png").await;

        let err = converter.convert(request("a.png", "jpeg")).await.unwrap_err();
        assert!(matches!(err, ConverterError::Rejected { status: 500, .. }));
        assert_eq!(converter.conversion_count().await, 1);
    }
}
