use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use convertino_core::{
    load_config, load_config_from_env, validate_config, ArtifactSink, Config, Converter,
    FormatCatalog, FsArtifactSink, HttpConverter, HttpFormatCatalog, SanitizedConfig,
};
use convertino_server::{api::create_router, state::AppState};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Convertino {}", VERSION);

    let config = load(&config_path())?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    let sanitized = SanitizedConfig::from(&config);
    let config_json = serde_json::to_string(&sanitized).unwrap_or_default();
    let config_hash = format!("{:x}", Sha256::digest(config_json.as_bytes()));

    info!("Configuration loaded successfully ({})", &config_hash[..16]);
    info!("Conversion service: {}", sanitized.remote.base_url);
    info!("Export directory: {:?}", config.export.output_dir);

    // Remote service clients
    let catalog: Arc<dyn FormatCatalog> = Arc::new(
        HttpFormatCatalog::new(&config.remote).context("Failed to create format catalog client")?,
    );
    let converter: Arc<dyn Converter> = Arc::new(
        HttpConverter::new(&config.remote).context("Failed to create converter client")?,
    );
    let sink: Arc<dyn ArtifactSink> = Arc::new(FsArtifactSink::new(&config.export.output_dir));

    // Create app state
    let state = Arc::new(AppState::new(config.clone(), catalog, converter, sink));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down");
    Ok(())
}

fn config_path() -> PathBuf {
    std::env::var("CONVERTINO_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"))
}

/// Load the config file, or the environment alone when there is no file.
fn load(path: &Path) -> Result<Config> {
    if path.exists() {
        info!("Loading configuration from {:?}", path);
        load_config(path).with_context(|| format!("Failed to load config from {:?}", path))
    } else {
        warn!(
            "No configuration file at {:?}, reading CONVERTINO_* environment variables",
            path
        );
        load_config_from_env().context(
            "Failed to load config from environment (is CONVERTINO_REMOTE__BASE_URL set?)",
        )
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
