pub mod catalog;
pub mod config;
pub mod converter;
pub mod exporter;
pub mod format;
pub mod metrics;
pub mod orchestrator;
pub mod session;
pub mod testing;

pub use catalog::{CatalogError, FormatCatalog, HttpFormatCatalog};
pub use config::{
    load_config, load_config_from_env, load_config_from_str, validate_config, Config, ConfigError,
    ExportConfig, RemoteConfig, SanitizedConfig, ServerConfig,
};
pub use converter::{ConversionOutput, ConversionRequest, Converter, ConverterError, HttpConverter};
pub use exporter::{ArtifactExporter, ArtifactSink, ExportError, ExportReceipt, FsArtifactSink};
pub use format::{FormatError, FormatFamily};
pub use orchestrator::{ConversionOrchestrator, ConversionOutcome, DiscoveryOutcome};
pub use session::{
    Artifact, BatchStart, ConversionStatus, EntryId, EntrySnapshot, FileSource, SessionError,
    SessionStore, SessionSummary, WriteOutcome,
};
