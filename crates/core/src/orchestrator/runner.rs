//! Conversion orchestrator implementation.

use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, error, info, warn};

use crate::catalog::FormatCatalog;
use crate::converter::{ConversionRequest, Converter};
use crate::format::{self, FormatFamily};
use crate::metrics;
use crate::session::{
    Artifact, ConversionStatus, ConversionTicket, DiscoveryTicket, EntryId, FileSource,
    SessionError, SessionStore, WriteOutcome,
};

use super::types::{ConversionOutcome, DiscoveryOutcome};

/// Drives the entries of a [`SessionStore`] through discovery and conversion.
///
/// Cheap to clone; clones share the store and the remote clients, so a clone
/// can be moved into a background task.
#[derive(Clone)]
pub struct ConversionOrchestrator {
    store: Arc<SessionStore>,
    catalog: Arc<dyn FormatCatalog>,
    converter: Arc<dyn Converter>,
}

impl ConversionOrchestrator {
    /// Create a new orchestrator.
    pub fn new(
        store: Arc<SessionStore>,
        catalog: Arc<dyn FormatCatalog>,
        converter: Arc<dyn Converter>,
    ) -> Self {
        Self {
            store,
            catalog,
            converter,
        }
    }

    /// The store this orchestrator writes to.
    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Replace the batch and discover formats for every new entry.
    pub async fn select_files(&self, files: Vec<FileSource>) -> Vec<EntryId> {
        let ids = self.store.set_batch(files).await;
        self.discover_all().await;
        ids
    }

    // =========================================================================
    // Discovery
    // =========================================================================

    /// Look up formats for every pending entry, concurrently.
    pub async fn discover_all(&self) -> Vec<DiscoveryOutcome> {
        let tickets = self.store.begin_pending_discoveries().await;
        if tickets.is_empty() {
            return Vec::new();
        }

        debug!("Discovering formats for {} entries", tickets.len());
        self.run_discoveries(tickets).await
    }

    /// Look up formats for one entry again, discarding its selection.
    pub async fn discover_one(&self, id: EntryId) -> Result<DiscoveryOutcome, SessionError> {
        let ticket = self.store.begin_discovery(id).await?;
        Ok(self.run_discovery(ticket).await)
    }

    /// Answer already issued discovery tickets, concurrently.
    pub async fn run_discoveries(&self, tickets: Vec<DiscoveryTicket>) -> Vec<DiscoveryOutcome> {
        join_all(tickets.into_iter().map(|ticket| self.run_discovery(ticket))).await
    }

    /// Answer one discovery ticket.
    pub async fn run_discovery(&self, ticket: DiscoveryTicket) -> DiscoveryOutcome {
        let formats = self.catalog.lookup(&ticket.extension).await;
        let write = self
            .store
            .set_discovered_formats(&ticket, formats.clone())
            .await;

        DiscoveryOutcome {
            id: ticket.id,
            extension: ticket.extension,
            formats,
            applied: write.is_applied(),
        }
    }

    // =========================================================================
    // Conversion
    // =========================================================================

    /// Convert every idle entry that has a chosen format.
    ///
    /// All eligible entries are marked converting up front, then converted
    /// concurrently. The returned outcomes are informational; the store
    /// already reflects each one.
    pub async fn convert_all(&self) -> Vec<ConversionOutcome> {
        let tickets = self.store.begin_all_conversions().await;
        if tickets.is_empty() {
            debug!("No entries eligible for conversion");
            return Vec::new();
        }

        info!("Converting {} files", tickets.len());
        let outcomes = self.run_conversions(tickets).await;

        let done = outcomes.iter().filter(|o| o.is_done()).count();
        info!(
            "Conversion round finished: {} done, {} failed",
            done,
            outcomes.len() - done
        );
        outcomes
    }

    /// Convert a single entry.
    pub async fn convert_one(&self, id: EntryId) -> Result<ConversionOutcome, SessionError> {
        let ticket = self.store.begin_conversion(id).await?;
        Ok(self.run_conversion(ticket).await)
    }

    /// Execute already issued conversion tickets, concurrently.
    pub async fn run_conversions(&self, tickets: Vec<ConversionTicket>) -> Vec<ConversionOutcome> {
        join_all(tickets.into_iter().map(|ticket| self.run_conversion(ticket))).await
    }

    /// Execute one conversion ticket and record its outcome.
    pub async fn run_conversion(&self, ticket: ConversionTicket) -> ConversionOutcome {
        let family = match FormatFamily::classify(&ticket.format) {
            Ok(family) => family,
            Err(e) => {
                warn!(entry = %ticket.id, "Not dispatching conversion: {}", e);
                metrics::CONVERSIONS_TOTAL
                    .with_label_values(&["none", "unroutable"])
                    .inc();
                return self.record_failure(ticket, e.to_string()).await;
            }
        };

        let request = ConversionRequest {
            family,
            file_name: ticket.source.name().to_string(),
            bytes: ticket.source.bytes().clone(),
            output_format: ticket.format.clone(),
        };

        debug!(
            entry = %ticket.id,
            file = %request.file_name,
            format = %request.output_format,
            "Dispatching {} conversion",
            family
        );

        let timer = metrics::CONVERSION_DURATION
            .with_label_values(&[family.as_str()])
            .start_timer();
        let result = self.converter.convert(request).await;
        timer.observe_duration();

        match result {
            Ok(output) => {
                metrics::CONVERSIONS_TOTAL
                    .with_label_values(&[family.as_str(), "success"])
                    .inc();
                let filename = format::output_filename(ticket.source.name(), &ticket.format);
                let artifact = Artifact::new(filename.clone(), ticket.format.clone(), output.bytes);

                let write = match self.store.set_result(&ticket, artifact).await {
                    Ok(write) => write,
                    Err(e) => {
                        error!(entry = %ticket.id, "Failed to record conversion result: {}", e);
                        WriteOutcome::Stale
                    }
                };
                if write.is_applied() {
                    info!(entry = %ticket.id, "Converted {} to {}", ticket.source.name(), filename);
                }

                ConversionOutcome::done(ticket.id, ticket.format, filename, write)
            }
            Err(e) => {
                warn!(
                    entry = %ticket.id,
                    "Conversion of {} to {} failed: {}",
                    ticket.source.name(),
                    ticket.format,
                    e
                );
                metrics::CONVERSIONS_TOTAL
                    .with_label_values(&[family.as_str(), "failed"])
                    .inc();
                self.record_failure(ticket, e.to_string()).await
            }
        }
    }

    async fn record_failure(&self, ticket: ConversionTicket, reason: String) -> ConversionOutcome {
        let write = match self
            .store
            .set_conversion_status(&ticket, ConversionStatus::Failed, reason.clone())
            .await
        {
            Ok(write) => write,
            Err(e) => {
                error!(entry = %ticket.id, "Failed to record conversion failure: {}", e);
                WriteOutcome::Stale
            }
        };

        ConversionOutcome::failed(ticket.id, ticket.format, reason, write)
    }
}
