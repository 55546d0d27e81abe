use axum::{
    middleware as axum_middleware,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::{audit, handlers, middleware, offline, scan, sync};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // API routes
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        .route("/status", get(handlers::get_status))
        // Scanning
        .route("/scan", post(scan::submit_scan))
        .route("/scanner/start", post(scan::start_scanning))
        .route("/scanner/stop", post(scan::stop_scanning))
        .route("/scanner/frame", post(scan::push_frame))
        // Offline data
        .route("/offline/download", post(offline::download))
        .route("/offline", delete(offline::clear))
        // Sync
        .route("/sync", post(sync::sync_now))
        .route("/sync/pending", get(sync::pending))
        // Audit / conflict report
        .route("/audit", get(audit::query_audit))
        .layer(axum_middleware::from_fn_with_state(
            Arc::clone(&state),
            middleware::auth_middleware,
        ))
        .layer(axum_middleware::from_fn(middleware::metrics_middleware));

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::get_metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
