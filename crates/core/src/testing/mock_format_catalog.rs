//! Mock format catalog for testing.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::{Notify, RwLock};

use crate::catalog::{CatalogError, FormatCatalog};

/// Mock implementation of the FormatCatalog trait.
///
/// Provides controllable behavior for testing:
/// - Configure formats per extension (unknown extensions answer `[]`)
/// - Simulate failures per extension
/// - Hold lookups until released, to interleave them with other operations
/// - Track requested extensions for assertions
///
/// # Example
///
/// ```rust,ignore
/// use convertino_core::testing::MockFormatCatalog;
///
/// let catalog = MockFormatCatalog::new();
/// catalog.set_formats("docx", &["pdf", "odt"]).await;
///
/// assert_eq!(catalog.lookup("docx").await, vec!["pdf", "odt"]);
/// assert_eq!(catalog.requested_extensions().await, vec!["docx"]);
/// ```
#[derive(Debug, Default)]
pub struct MockFormatCatalog {
    /// Formats by lower-cased extension.
    formats: Arc<RwLock<HashMap<String, Vec<String>>>>,
    /// Extensions whose lookup fails.
    failing: Arc<RwLock<HashSet<String>>>,
    /// Extensions whose lookup waits for a release.
    holds: Arc<RwLock<HashMap<String, Arc<Notify>>>>,
    /// Every extension sent to the catalog, in order.
    requests: Arc<RwLock<Vec<String>>>,
}

impl MockFormatCatalog {
    /// Create a new mock catalog that knows no extensions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the formats returned for an extension.
    pub async fn set_formats(&self, extension: &str, formats: &[&str]) {
        self.formats.write().await.insert(
            extension.to_ascii_lowercase(),
            formats.iter().map(|f| f.to_string()).collect(),
        );
    }

    /// Make lookups for an extension fail.
    pub async fn fail_extension(&self, extension: &str) {
        self.failing
            .write()
            .await
            .insert(extension.to_ascii_lowercase());
    }

    /// Make lookups for an extension wait until [`Self::release_extension`].
    pub async fn hold_extension(&self, extension: &str) {
        self.holds
            .write()
            .await
            .insert(extension.to_ascii_lowercase(), Arc::new(Notify::new()));
    }

    /// Let one held lookup for an extension complete.
    pub async fn release_extension(&self, extension: &str) {
        if let Some(gate) = self.holds.read().await.get(&extension.to_ascii_lowercase()) {
            gate.notify_one();
        }
    }

    /// Extensions requested so far.
    pub async fn requested_extensions(&self) -> Vec<String> {
        self.requests.read().await.clone()
    }

    /// Wait until at least `count` lookups have been received.
    pub async fn wait_for_requests(&self, count: usize) {
        while self.requests.read().await.len() < count {
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
    }
}

#[async_trait]
impl FormatCatalog for MockFormatCatalog {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch_formats(&self, extension: &str) -> Result<Vec<String>, CatalogError> {
        let key = extension.to_ascii_lowercase();
        self.requests.write().await.push(key.clone());

        let gate = self.holds.read().await.get(&key).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        if self.failing.read().await.contains(&key) {
            return Err(CatalogError::ApiError {
                status: 503,
                message: "mock catalog unavailable".to_string(),
            });
        }

        Ok(self
            .formats
            .read()
            .await
            .get(&key)
            .cloned()
            .unwrap_or_default())
    }
}
