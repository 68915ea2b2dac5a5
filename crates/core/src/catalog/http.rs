//! HTTP format catalog client.
//!
//! `GET {base}/formats/{extension}` answers with `{"formats": [...]}`. A
//! missing or null `formats` field means no formats are reachable.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::config::RemoteConfig;

use super::{CatalogError, FormatCatalog};

/// Format catalog backed by the remote conversion service.
pub struct HttpFormatCatalog {
    client: Client,
    base_url: String,
}

impl HttpFormatCatalog {
    /// Create a new catalog client.
    pub fn new(config: &RemoteConfig) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url_trimmed().to_string(),
        })
    }

    fn formats_url(&self, extension: &str) -> String {
        format!(
            "{}/formats/{}",
            self.base_url,
            urlencoding::encode(extension)
        )
    }
}

/// Extract the format list from a catalog response body.
fn parse_formats(body: &str) -> Result<Vec<String>, CatalogError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| CatalogError::ParseError(format!("invalid JSON: {}", e)))?;

    let object = value
        .as_object()
        .ok_or_else(|| CatalogError::ParseError("expected a JSON object".to_string()))?;

    match object.get("formats") {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str().map(str::to_string).ok_or_else(|| {
                    CatalogError::ParseError(format!("format entry is not a string: {}", item))
                })
            })
            .collect(),
        Some(other) => Err(CatalogError::ParseError(format!(
            "'formats' is not an array: {}",
            other
        ))),
    }
}

#[async_trait]
impl FormatCatalog for HttpFormatCatalog {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch_formats(&self, extension: &str) -> Result<Vec<String>, CatalogError> {
        let url = self.formats_url(extension);
        debug!("Format lookup: {}", url);

        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;
        parse_formats(&body)
    }
}
