//! Types for the conversion orchestrator.

use serde::Serialize;

use crate::session::{ConversionStatus, EntryId, WriteOutcome};

/// What happened to one catalog lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoveryOutcome {
    pub id: EntryId,
    pub extension: String,
    pub formats: Vec<String>,
    /// False when the answer arrived for a removed or superseded entry.
    pub applied: bool,
}

/// What happened to one conversion. Reported for logging only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionOutcome {
    pub id: EntryId,
    pub format: String,
    /// Either `Done` or `Failed`.
    pub status: ConversionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// False when the outcome arrived for a removed or superseded entry.
    pub applied: bool,
}

impl ConversionOutcome {
    pub(crate) fn done(
        id: EntryId,
        format: String,
        output_filename: String,
        write: WriteOutcome,
    ) -> Self {
        Self {
            id,
            format,
            status: ConversionStatus::Done,
            output_filename: Some(output_filename),
            reason: None,
            applied: write.is_applied(),
        }
    }

    pub(crate) fn failed(id: EntryId, format: String, reason: String, write: WriteOutcome) -> Self {
        Self {
            id,
            format,
            status: ConversionStatus::Failed,
            output_filename: None,
            reason: Some(reason),
            applied: write.is_applied(),
        }
    }

    pub fn is_done(&self) -> bool {
        self.status == ConversionStatus::Done
    }
}
