//! Router creation and configuration
//!
//! Static routes are registered here; everything else falls through to
//! the dispatcher, which resolves `/service/...` paths at request time.

use super::dispatcher::dispatch;
use super::handlers::*;
use super::types::AppState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Create REST API router
pub fn create_router(state: AppState) -> Router {
    let upload_limit = state.max_upload_bytes;

    Router::new()
        .route("/", get(catalog))
        .route("/health", get(health))
        .route(
            "/upload",
            post(upload).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/upload/openapi.json", get(upload_openapi))
        .fallback(dispatch)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
