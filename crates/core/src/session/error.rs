//! Error types for the session module.

use thiserror::Error;

use super::types::{ConversionStatus, EntryId};

/// Errors returned by session operations that the caller can act on.
///
/// Responses that lost a race with a newer request are not errors; they
/// yield [`super::WriteOutcome::Stale`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// No entry with this id in the current batch.
    #[error("entry not found: {0}")]
    EntryNotFound(EntryId),

    /// Formats for the entry have not been discovered yet.
    #[error("formats for entry {0} are still being discovered")]
    FormatsPending(EntryId),

    /// The requested format is not among the discovered ones.
    #[error("format '{format}' is not available for entry {id} (available: {})", .available.join(", "))]
    FormatNotOffered {
        id: EntryId,
        format: String,
        available: Vec<String>,
    },

    /// The entry cannot start a conversion in its current state.
    #[error("entry {id} cannot be converted: {reason}")]
    NotEligible { id: EntryId, reason: String },

    /// The requested status change is not a legal transition.
    #[error("entry {id} cannot move from {from} to {to}")]
    InvalidTransition {
        id: EntryId,
        from: ConversionStatus,
        to: ConversionStatus,
    },
}

impl SessionError {
    pub fn not_eligible(id: EntryId, reason: impl Into<String>) -> Self {
        Self::NotEligible {
            id,
            reason: reason.into(),
        }
    }
}
