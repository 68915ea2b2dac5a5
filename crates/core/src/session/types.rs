//! Types for the conversion session.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::format;

/// Stable identifier of an entry.
///
/// Ids are allocated monotonically for the lifetime of a store and are never
/// reused, so an id held by an in-flight request can never point at a
/// different file later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub u64);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for EntryId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// A user-selected file. Bytes are shared, never copied by the session.
#[derive(Debug, Clone)]
pub struct FileSource {
    name: String,
    bytes: Arc<[u8]>,
}

impl FileSource {
    pub fn new(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &Arc<[u8]> {
        &self.bytes
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Lower-cased extension of the file name, empty if it has none.
    pub fn extension(&self) -> String {
        format::extension_of(&self.name)
    }
}

/// Result of a finished conversion.
#[derive(Debug, Clone)]
pub struct Artifact {
    filename: String,
    format: String,
    bytes: Arc<[u8]>,
}

impl Artifact {
    pub fn new(
        filename: impl Into<String>,
        format: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Self {
        Self {
            filename: filename.into(),
            format: format.into(),
            bytes: bytes.into(),
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn format(&self) -> &str {
        &self.format
    }

    pub fn bytes(&self) -> &Arc<[u8]> {
        &self.bytes
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Output formats reachable from an entry's extension.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Discovery {
    /// Lookup issued, no answer yet.
    #[default]
    Pending,
    /// Lookup answered. An empty list means the file type is unsupported.
    Ready(Vec<String>),
}

impl Discovery {
    pub fn formats(&self) -> Option<&[String]> {
        match self {
            Self::Pending => None,
            Self::Ready(formats) => Some(formats.as_slice()),
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Ready(formats) if formats.is_empty())
    }

    fn state_name(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Ready(formats) if formats.is_empty() => "unsupported",
            Self::Ready(_) => "ready",
        }
    }
}

/// Externally visible conversion status of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionStatus {
    Idle,
    Converting,
    Done,
    Failed,
}

impl ConversionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Converting => "converting",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for ConversionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Internal conversion state. The artifact lives inside `Done`, so an entry
/// has a result exactly when it is done.
#[derive(Debug, Clone, Default)]
pub(crate) enum ConversionState {
    #[default]
    Idle,
    Converting,
    Done(Artifact),
    Failed { reason: String },
}

impl ConversionState {
    pub(crate) fn status(&self) -> ConversionStatus {
        match self {
            Self::Idle => ConversionStatus::Idle,
            Self::Converting => ConversionStatus::Converting,
            Self::Done(_) => ConversionStatus::Done,
            Self::Failed { .. } => ConversionStatus::Failed,
        }
    }
}

/// One file of the current batch.
#[derive(Debug, Clone)]
pub(crate) struct FileEntry {
    pub(crate) id: EntryId,
    pub(crate) source: FileSource,
    pub(crate) extension: String,
    pub(crate) discovery: Discovery,
    pub(crate) chosen_format: Option<String>,
    pub(crate) conversion: ConversionState,
    /// Bumped by every request-issuing mutation; responses carrying an older
    /// version are dropped.
    pub(crate) version: u64,
    pub(crate) added_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

impl FileEntry {
    pub(crate) fn new(id: EntryId, source: FileSource) -> Self {
        let now = Utc::now();
        Self {
            id,
            extension: source.extension(),
            source,
            discovery: Discovery::Pending,
            chosen_format: None,
            conversion: ConversionState::Idle,
            version: 0,
            added_at: now,
            updated_at: now,
        }
    }

    /// Advance the version, invalidating every outstanding ticket.
    pub(crate) fn bump(&mut self) -> u64 {
        self.version += 1;
        self.updated_at = Utc::now();
        self.version
    }

    pub(crate) fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub(crate) fn is_convertible(&self) -> bool {
        self.chosen_format.is_some() && matches!(self.conversion, ConversionState::Idle)
    }

    pub(crate) fn snapshot(&self) -> EntrySnapshot {
        let (failure, output_filename, output_size) = match &self.conversion {
            ConversionState::Failed { reason } => (Some(reason.clone()), None, None),
            ConversionState::Done(artifact) => (
                None,
                Some(artifact.filename().to_string()),
                Some(artifact.size()),
            ),
            _ => (None, None, None),
        };

        EntrySnapshot {
            id: self.id,
            name: self.source.name().to_string(),
            size_bytes: self.source.size(),
            extension: self.extension.clone(),
            discovery: self.discovery.state_name().to_string(),
            formats: self.discovery.formats().map(<[String]>::to_vec),
            chosen_format: self.chosen_format.clone(),
            status: self.conversion.status(),
            failure,
            output_filename,
            output_size_bytes: output_size,
            added_at: self.added_at,
            updated_at: self.updated_at,
        }
    }
}

/// Read-only view of an entry.
#[derive(Debug, Clone, Serialize)]
pub struct EntrySnapshot {
    pub id: EntryId,
    pub name: String,
    pub size_bytes: u64,
    pub extension: String,
    /// "pending", "unsupported" or "ready".
    pub discovery: String,
    /// Discovered formats; `None` while discovery is pending.
    pub formats: Option<Vec<String>>,
    pub chosen_format: Option<String>,
    pub status: ConversionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_size_bytes: Option<u64>,
    pub added_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EntrySnapshot {
    pub fn has_result(&self) -> bool {
        self.output_filename.is_some()
    }
}

/// Per-state counts for the current batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub batch_id: String,
    pub total: usize,
    pub discovery_pending: usize,
    pub unsupported: usize,
    /// Entries with a chosen format, whatever their status.
    pub with_chosen_format: usize,
    pub idle: usize,
    pub converting: usize,
    pub done: usize,
    pub failed: usize,
}

/// Issued when a catalog lookup starts; required to record its answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryTicket {
    pub id: EntryId,
    pub extension: String,
    pub(crate) version: u64,
}

/// Issued when an entry is marked converting; required to record the outcome.
#[derive(Debug, Clone)]
pub struct ConversionTicket {
    pub id: EntryId,
    pub source: FileSource,
    pub format: String,
    pub(crate) version: u64,
}

/// A freshly selected batch, captured under the same lock that created it.
#[derive(Debug, Clone)]
pub struct BatchStart {
    pub batch_id: String,
    pub entries: Vec<EntrySnapshot>,
    /// Discovery tickets for every new entry.
    pub tickets: Vec<DiscoveryTicket>,
}

/// Whether a guarded write was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Applied,
    /// The entry was removed, the batch replaced, or a newer request issued.
    Stale,
}

impl WriteOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }
}
