use crate::{auth::RequireAuth, store::StoreError, validate, AppState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

// ── Request types ──────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateLink {
    url: String,
    #[serde(default)]
    indexable: bool,
}

#[derive(Deserialize)]
pub struct UpdateLink {
    url: String,
    #[serde(default)]
    indexable: bool,
}

// ── Handlers ───────────────────────────────────────────────────────────────

/// POST /api/links
pub async fn create_link(
    _auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateLink>,
) -> Response {
    let url = match validate::validate_url(&body.url) {
        Ok(url) => url,
        Err(e) => return (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()).into_response(),
    };

    match state.store.allocate(&url, body.indexable).await {
        Ok(record) => {
            tracing::info!("Created {}/{} -> {}", state.config.base_url, record.code, record.url);
            (StatusCode::CREATED, Json(record)).into_response()
        }
        Err(e) => store_failure("create link", e),
    }
}

/// PATCH /api/links/:code
pub async fn update_link(
    _auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
    Json(body): Json<UpdateLink>,
) -> Response {
    let url = match validate::validate_url(&body.url) {
        Ok(url) => url,
        Err(e) => return (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()).into_response(),
    };

    match state.store.update(&code, &url, body.indexable).await {
        Ok(record) => Json(record).into_response(),
        Err(e) => store_failure("update link", e),
    }
}

/// DELETE /api/links/:code
pub async fn delete_link(
    _auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> Response {
    match state.store.delete(&code).await {
        Ok(()) => Json(json!({ "message": "Deleted" })).into_response(),
        Err(e) => store_failure("delete link", e),
    }
}

/// GET /api/links/:code/stats
pub async fn link_stats(
    _auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> Response {
    match state.store.analytics(&code).await {
        Ok(record) => Json(record).into_response(),
        Err(e) => store_failure("read link stats", e),
    }
}

// ── Private helpers ────────────────────────────────────────────────────────

/// Map a store error onto the HTTP response the management API promises:
/// missing records are a normal 404, bad input is the client's fault, and
/// everything else is a server-side failure worth logging.
fn store_failure(action: &str, err: StoreError) -> Response {
    match err {
        StoreError::NotFound => (StatusCode::NOT_FOUND, "Short link not found").into_response(),
        StoreError::InvalidInput(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg).into_response(),
        StoreError::KeyspaceExhausted { attempts } => {
            tracing::error!("Failed to {}: key space exhausted after {} attempts", action, attempts);
            (StatusCode::INTERNAL_SERVER_ERROR, "Could not allocate a short code").into_response()
        }
        StoreError::Database(e) => {
            tracing::error!("Failed to {}: {:?}", action, e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal error").into_response()
        }
    }
}
