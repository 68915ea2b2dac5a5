//! Conversion orchestrator.
//!
//! Drives entries through discovery and conversion:
//! - **Discovery**: one catalog lookup per pending entry, all concurrent
//! - **Conversion**: one remote request per eligible entry, all concurrent
//!
//! Every response is written to the session store as soon as it arrives, so
//! a slow or failing file never holds back the others. The store drops
//! answers for entries that were removed or re-requested in the meantime.

mod runner;
mod types;

pub use runner::ConversionOrchestrator;
pub use types::{ConversionOutcome, DiscoveryOutcome};
