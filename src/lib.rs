use std::sync::Arc;

use axum::{
    http::StatusCode,
    routing::{get, patch, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub mod auth;
pub mod codegen;
pub mod config;
pub mod handlers;
pub mod models;
pub mod store;
pub mod validate;

// ── Shared application state ───────────────────────────────────────────────

pub struct AppState {
    pub config: config::AppConfig,
    pub store: Arc<dyn store::LinkStore>,
}

// ── Router ─────────────────────────────────────────────────────────────────

/// Assemble the full application router over the given state.
///
/// Kept out of `main` so the integration tests can drive the exact router the
/// binary serves.
pub fn app(state: Arc<AppState>) -> Router {
    let api_router = Router::new()
        .route("/links", post(handlers::api::create_link))
        .route(
            "/links/:code",
            patch(handlers::api::update_link).delete(handlers::api::delete_link),
        )
        .route("/links/:code/stats", get(handlers::api::link_stats));

    Router::new()
        // Root redirect to the configured homepage
        .route("/", get(handlers::redirect::index))
        // Health check — returns 200 OK with no auth required
        .route("/health", get(|| async { StatusCode::OK }))
        // Management API (HTTP Basic gate inside each handler's extractor)
        .nest("/api", api_router)
        // Short-link redirect — a single path segment under the root
        .route("/:code", get(handlers::redirect::redirect))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
