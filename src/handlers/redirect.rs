use crate::{store::StoreError, AppState};
use axum::{
    extract::{Path, State},
    http::{header::HeaderValue, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;

/// GET /:code
///
/// Resolve the short code — the store advances the click counter in the same
/// atomic step — and answer with a temporary redirect to the target. Links
/// that opted out of indexing get an `X-Robots-Tag: noindex` hint.
pub async fn redirect(State(state): State<Arc<AppState>>, Path(code): Path<String>) -> Response {
    match state.store.resolve(&code).await {
        Ok(resolution) => {
            let mut response = Redirect::temporary(&resolution.url).into_response();
            if !resolution.indexable {
                response
                    .headers_mut()
                    .insert("x-robots-tag", HeaderValue::from_static("noindex"));
            }
            response
        }
        Err(StoreError::NotFound) | Err(StoreError::InvalidInput(_)) => {
            (StatusCode::NOT_FOUND, "Short link not found").into_response()
        }
        Err(e) => {
            tracing::error!("Store error resolving '{}': {:?}", code, e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal error").into_response()
        }
    }
}

/// GET /
///
/// Redirect root visitors to the configured ROOT_REDIRECT_URL (e.g. the
/// project's public homepage). Short links live one path segment down.
pub async fn index(State(state): State<Arc<AppState>>) -> Redirect {
    Redirect::temporary(&state.config.root_redirect_url)
}
