//! Authoritative state of the current batch.
//!
//! Every mutation goes through [`SessionStore`]. Operations that start a
//! request (`begin_discovery`, `set_chosen_format`, `begin_conversion`) bump
//! the entry's version and hand out a ticket; operations that record a
//! response check the ticket against the entry and silently drop it when the
//! entry is gone or has moved on.

use std::collections::BTreeMap;

use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::metrics;

use super::error::SessionError;
use super::types::{
    Artifact, BatchStart, ConversionState, ConversionStatus, ConversionTicket, Discovery,
    DiscoveryTicket, EntryId, EntrySnapshot, FileEntry, FileSource, SessionSummary, WriteOutcome,
};

#[derive(Debug)]
struct Session {
    batch_id: String,
    next_id: u64,
    entries: BTreeMap<EntryId, FileEntry>,
}

impl Session {
    fn allocate_id(&mut self) -> EntryId {
        self.next_id += 1;
        EntryId(self.next_id)
    }

    fn entry_mut(&mut self, id: EntryId) -> Result<&mut FileEntry, SessionError> {
        self.entries
            .get_mut(&id)
            .ok_or(SessionError::EntryNotFound(id))
    }

    /// Entry for a response, or `None` if the ticket has been superseded.
    fn current_mut(&mut self, id: EntryId, version: u64) -> Option<&mut FileEntry> {
        self.entries
            .get_mut(&id)
            .filter(|entry| entry.version == version)
    }
}

/// Single source of truth for the entries of the current batch.
#[derive(Debug)]
pub struct SessionStore {
    inner: RwLock<Session>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Session {
                batch_id: Uuid::new_v4().to_string(),
                next_id: 0,
                entries: BTreeMap::new(),
            }),
        }
    }

    // =========================================================================
    // Batch membership
    // =========================================================================

    /// Replace the whole batch. All previous entries and their derived state
    /// are dropped; outstanding tickets for them become stale.
    pub async fn set_batch(&self, files: Vec<FileSource>) -> Vec<EntryId> {
        let mut session = self.inner.write().await;
        Self::replace_entries(&mut session, files)
    }

    /// Replace the whole batch and issue discovery tickets for it in one step.
    ///
    /// The returned snapshots describe exactly this batch, even if another
    /// selection replaces it before the caller reads them.
    pub async fn start_batch(&self, files: Vec<FileSource>) -> BatchStart {
        let mut session = self.inner.write().await;
        Self::replace_entries(&mut session, files);

        let tickets = session
            .entries
            .values_mut()
            .map(Self::issue_discovery)
            .collect();

        BatchStart {
            batch_id: session.batch_id.clone(),
            entries: session.entries.values().map(FileEntry::snapshot).collect(),
            tickets,
        }
    }

    fn replace_entries(session: &mut Session, files: Vec<FileSource>) -> Vec<EntryId> {
        session.batch_id = Uuid::new_v4().to_string();
        session.entries.clear();

        let mut ids = Vec::with_capacity(files.len());
        for source in files {
            let id = session.allocate_id();
            session.entries.insert(id, FileEntry::new(id, source));
            ids.push(id);
        }

        info!(
            batch_id = %session.batch_id,
            files = ids.len(),
            "New batch selected"
        );
        ids
    }

    /// Remove one entry. Other entries keep their ids.
    pub async fn remove_entry(&self, id: EntryId) -> Result<EntrySnapshot, SessionError> {
        let mut session = self.inner.write().await;
        let entry = session
            .entries
            .remove(&id)
            .ok_or(SessionError::EntryNotFound(id))?;
        debug!(entry = %id, name = entry.source.name(), "Entry removed");
        Ok(entry.snapshot())
    }

    // =========================================================================
    // Discovery
    // =========================================================================

    /// Start a catalog lookup for one entry.
    ///
    /// The entry goes back to pending discovery, and its selection and any
    /// conversion state are cleared since they were based on the old formats.
    pub async fn begin_discovery(&self, id: EntryId) -> Result<DiscoveryTicket, SessionError> {
        let mut session = self.inner.write().await;
        let entry = session.entry_mut(id)?;
        Ok(Self::issue_discovery(entry))
    }

    /// Start catalog lookups for every entry whose discovery is pending.
    pub async fn begin_pending_discoveries(&self) -> Vec<DiscoveryTicket> {
        let mut session = self.inner.write().await;
        session
            .entries
            .values_mut()
            .filter(|entry| entry.discovery.is_pending())
            .map(Self::issue_discovery)
            .collect()
    }

    fn issue_discovery(entry: &mut FileEntry) -> DiscoveryTicket {
        entry.discovery = Discovery::Pending;
        entry.chosen_format = None;
        entry.conversion = ConversionState::Idle;
        let version = entry.bump();
        DiscoveryTicket {
            id: entry.id,
            extension: entry.extension.clone(),
            version,
        }
    }

    /// Record the formats returned by the catalog.
    pub async fn set_discovered_formats(
        &self,
        ticket: &DiscoveryTicket,
        formats: Vec<String>,
    ) -> WriteOutcome {
        let mut session = self.inner.write().await;
        let Some(entry) = session.current_mut(ticket.id, ticket.version) else {
            debug!(entry = %ticket.id, "Dropping superseded discovery result");
            metrics::STALE_WRITES.with_label_values(&["discovery"]).inc();
            return WriteOutcome::Stale;
        };

        debug!(
            entry = %ticket.id,
            extension = %ticket.extension,
            formats = ?formats,
            "Formats discovered"
        );
        entry.discovery = Discovery::Ready(formats);
        entry.touch();
        WriteOutcome::Applied
    }

    // =========================================================================
    // Format selection
    // =========================================================================

    /// Record the user's target format.
    ///
    /// The format must be one of the discovered formats (compared ignoring
    /// ASCII case; the catalog's spelling is kept). Any previous conversion
    /// result is discarded and the entry returns to idle, including when the
    /// same format is chosen again, which is how a failed conversion is
    /// retried.
    pub async fn set_chosen_format(
        &self,
        id: EntryId,
        format: &str,
    ) -> Result<EntrySnapshot, SessionError> {
        let mut session = self.inner.write().await;
        let entry = session.entry_mut(id)?;

        let available = entry
            .discovery
            .formats()
            .ok_or(SessionError::FormatsPending(id))?;
        let chosen = available
            .iter()
            .find(|candidate| candidate.eq_ignore_ascii_case(format.trim()))
            .cloned()
            .ok_or_else(|| SessionError::FormatNotOffered {
                id,
                format: format.to_string(),
                available: available.to_vec(),
            })?;

        debug!(entry = %id, format = %chosen, "Output format chosen");
        entry.chosen_format = Some(chosen);
        entry.conversion = ConversionState::Idle;
        entry.bump();
        Ok(entry.snapshot())
    }

    // =========================================================================
    // Conversion
    // =========================================================================

    /// Mark one entry as converting.
    ///
    /// Only idle entries with a chosen format are eligible.
    pub async fn begin_conversion(&self, id: EntryId) -> Result<ConversionTicket, SessionError> {
        let mut session = self.inner.write().await;
        let entry = session.entry_mut(id)?;

        if entry.chosen_format.is_none() {
            return Err(SessionError::not_eligible(id, "no output format chosen"));
        }
        if !matches!(entry.conversion, ConversionState::Idle) {
            return Err(SessionError::not_eligible(
                id,
                format!("status is {}", entry.conversion.status()),
            ));
        }

        Ok(Self::issue_conversion(entry))
    }

    /// Mark every eligible entry as converting in one step.
    pub async fn begin_all_conversions(&self) -> Vec<ConversionTicket> {
        let mut session = self.inner.write().await;
        session
            .entries
            .values_mut()
            .filter(|entry| entry.is_convertible())
            .map(Self::issue_conversion)
            .collect()
    }

    fn issue_conversion(entry: &mut FileEntry) -> ConversionTicket {
        entry.conversion = ConversionState::Converting;
        let version = entry.bump();
        ConversionTicket {
            id: entry.id,
            source: entry.source.clone(),
            format: entry.chosen_format.clone().unwrap_or_default(),
            version,
        }
    }

    /// Record a status change for a converting entry.
    ///
    /// A converting entry may only end in a terminal state, and `done`
    /// requires an artifact, so the only status accepted here is `failed`.
    /// Use [`Self::set_result`] to complete a conversion.
    pub async fn set_conversion_status(
        &self,
        ticket: &ConversionTicket,
        status: ConversionStatus,
        reason: impl Into<String>,
    ) -> Result<WriteOutcome, SessionError> {
        let mut session = self.inner.write().await;
        let Some(entry) = session.current_mut(ticket.id, ticket.version) else {
            debug!(entry = %ticket.id, "Dropping superseded conversion status");
            metrics::STALE_WRITES.with_label_values(&["conversion"]).inc();
            return Ok(WriteOutcome::Stale);
        };

        let current = entry.conversion.status();
        if current != ConversionStatus::Converting || status != ConversionStatus::Failed {
            return Err(SessionError::InvalidTransition {
                id: ticket.id,
                from: current,
                to: status,
            });
        }

        entry.conversion = ConversionState::Failed {
            reason: reason.into(),
        };
        entry.touch();
        Ok(WriteOutcome::Applied)
    }

    /// Store the artifact of a finished conversion and mark the entry done.
    pub async fn set_result(
        &self,
        ticket: &ConversionTicket,
        artifact: Artifact,
    ) -> Result<WriteOutcome, SessionError> {
        let mut session = self.inner.write().await;
        let Some(entry) = session.current_mut(ticket.id, ticket.version) else {
            debug!(entry = %ticket.id, "Dropping superseded conversion result");
            metrics::STALE_WRITES.with_label_values(&["conversion"]).inc();
            return Ok(WriteOutcome::Stale);
        };

        let current = entry.conversion.status();
        if current != ConversionStatus::Converting {
            return Err(SessionError::InvalidTransition {
                id: ticket.id,
                from: current,
                to: ConversionStatus::Done,
            });
        }

        entry.conversion = ConversionState::Done(artifact);
        entry.touch();
        Ok(WriteOutcome::Applied)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Snapshots of all entries, in selection order.
    pub async fn snapshot(&self) -> Vec<EntrySnapshot> {
        let session = self.inner.read().await;
        session.entries.values().map(FileEntry::snapshot).collect()
    }

    /// Snapshot of one entry.
    pub async fn entry(&self, id: EntryId) -> Option<EntrySnapshot> {
        let session = self.inner.read().await;
        session.entries.get(&id).map(FileEntry::snapshot)
    }

    /// The artifact of a done entry.
    pub async fn artifact(&self, id: EntryId) -> Option<Artifact> {
        let session = self.inner.read().await;
        match session.entries.get(&id).map(|entry| &entry.conversion) {
            Some(ConversionState::Done(artifact)) => Some(artifact.clone()),
            _ => None,
        }
    }

    /// Counts per state for the current batch.
    pub async fn summary(&self) -> SessionSummary {
        let session = self.inner.read().await;
        let mut summary = SessionSummary {
            batch_id: session.batch_id.clone(),
            total: session.entries.len(),
            ..Default::default()
        };

        for entry in session.entries.values() {
            if entry.discovery.is_pending() {
                summary.discovery_pending += 1;
            }
            if entry.discovery.is_unsupported() {
                summary.unsupported += 1;
            }
            if entry.chosen_format.is_some() {
                summary.with_chosen_format += 1;
            }
            match entry.conversion.status() {
                ConversionStatus::Idle => summary.idle += 1,
                ConversionStatus::Converting => summary.converting += 1,
                ConversionStatus::Done => summary.done += 1,
                ConversionStatus::Failed => summary.failed += 1,
            }
        }

        summary
    }

    /// Identifier of the current batch, regenerated by every `set_batch`.
    pub async fn batch_id(&self) -> String {
        self.inner.read().await.batch_id.clone()
    }

    /// Number of entries with a chosen format.
    pub async fn chosen_count(&self) -> usize {
        let session = self.inner.read().await;
        session
            .entries
            .values()
            .filter(|entry| entry.chosen_format.is_some())
            .count()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.entries.is_empty()
    }
}
