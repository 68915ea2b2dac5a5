use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::{entries, handlers, middleware::metrics_middleware};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let max_upload = state.config().server.max_upload_bytes;

    // API routes
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Batch
        .route(
            "/batch",
            put(entries::replace_batch).layer(DefaultBodyLimit::max(max_upload)),
        )
        .route("/convert", post(entries::convert_all))
        // Entries
        .route("/entries", get(entries::list_entries))
        .route(
            "/entries/{id}",
            get(entries::get_entry).delete(entries::remove_entry),
        )
        .route("/entries/{id}/format", put(entries::choose_format))
        .route("/entries/{id}/discover", post(entries::rediscover))
        .route("/entries/{id}/convert", post(entries::convert_entry))
        .route("/entries/{id}/download", get(entries::download))
        .route("/entries/{id}/export", post(entries::export_entry));

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::metrics))
        .with_state(state)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
