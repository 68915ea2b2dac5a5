//! Conversion session: the per-file state of the current batch.
//!
//! An entry moves through discovery (which output formats are reachable from
//! its extension), format selection, and conversion:
//!
//! ```text
//! pending ──► ready(formats) ──► chosen ──► converting ──► done | failed
//!                  │                ▲                         │
//!                  └─► unsupported  └──── choose format again ◄┘
//! ```
//!
//! All state lives in [`SessionStore`]; everything else reads snapshots.

mod error;
mod store;
mod types;

pub use error::SessionError;
pub use store::SessionStore;
pub use types::{
    Artifact, BatchStart, ConversionStatus, ConversionTicket, Discovery, DiscoveryTicket,
    EntryId, EntrySnapshot, FileSource, SessionSummary, WriteOutcome,
};
