use std::sync::Arc;

use convertino_core::{
    ArtifactExporter, ArtifactSink, Config, ConversionOrchestrator, Converter, FormatCatalog,
    SanitizedConfig, SessionStore,
};

/// Shared application state
pub struct AppState {
    config: Config,
    store: Arc<SessionStore>,
    orchestrator: ConversionOrchestrator,
    exporter: ArtifactExporter,
}

impl AppState {
    pub fn new(
        config: Config,
        catalog: Arc<dyn FormatCatalog>,
        converter: Arc<dyn Converter>,
        sink: Arc<dyn ArtifactSink>,
    ) -> Self {
        let store = Arc::new(SessionStore::new());
        let orchestrator = ConversionOrchestrator::new(Arc::clone(&store), catalog, converter);
        let exporter = ArtifactExporter::new(Arc::clone(&store), sink);

        Self {
            config,
            store,
            orchestrator,
            exporter,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    pub fn orchestrator(&self) -> &ConversionOrchestrator {
        &self.orchestrator
    }

    pub fn exporter(&self) -> &ArtifactExporter {
        &self.exporter
    }
}
