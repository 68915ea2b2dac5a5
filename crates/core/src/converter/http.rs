//! HTTP converter client.
//!
//! Both endpoints take a multipart body with a `file` part and an
//! `output_format` text part and answer with the converted file.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, multipart, Client};
use tracing::debug;

use crate::config::RemoteConfig;
use crate::format::FormatFamily;

use super::error::ConverterError;
use super::traits::Converter;
use super::types::{ConversionOutput, ConversionRequest};

/// Converter backed by the remote conversion service.
pub struct HttpConverter {
    client: Client,
    base_url: String,
    timeout_secs: u64,
}

impl HttpConverter {
    /// Create a new converter client.
    pub fn new(config: &RemoteConfig) -> Result<Self, ConverterError> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ConverterError::Client(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url_trimmed().to_string(),
            timeout_secs: config.timeout_secs,
        })
    }

    /// Endpoint URL for a format family.
    pub fn endpoint_url(&self, family: FormatFamily) -> String {
        format!("{}/{}", self.base_url, family.endpoint_path())
    }

    fn map_send_error(&self, e: reqwest::Error) -> ConverterError {
        if e.is_timeout() {
            ConverterError::Timeout {
                timeout_secs: self.timeout_secs,
            }
        } else {
            ConverterError::transport(e.to_string())
        }
    }
}

#[async_trait]
impl Converter for HttpConverter {
    fn name(&self) -> &str {
        "http"
    }

    async fn convert(
        &self,
        request: ConversionRequest,
    ) -> Result<ConversionOutput, ConverterError> {
        let url = self.endpoint_url(request.family);
        debug!(
            "Submitting {} ({} bytes) to {} for {}",
            request.file_name,
            request.bytes.len(),
            url,
            request.output_format
        );

        let file_part =
            multipart::Part::bytes(request.bytes.to_vec()).file_name(request.file_name.clone());
        let form = multipart::Form::new()
            .part("file", file_part)
            .text("output_format", request.output_format.clone());

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ConverterError::rejected(status.as_u16(), body));
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.map_send_error(e))?;

        Ok(ConversionOutput {
            bytes: bytes.to_vec(),
            content_type,
        })
    }
}
