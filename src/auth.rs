use crate::AppState;
use async_trait::async_trait;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts, StatusCode},
    response::{IntoResponse, Response},
};
use axum_extra::{
    headers::{authorization::Basic, Authorization},
    TypedHeader,
};
use std::sync::Arc;

/// Extractor that enforces HTTP Basic authentication on any handler that
/// includes it as a parameter. Requests without valid credentials are
/// rejected with 401 before the handler runs; the store never learns about
/// credentials at all.
pub struct RequireAuth;

#[async_trait]
impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(credentials)) =
            TypedHeader::<Authorization<Basic>>::from_request_parts(parts, state)
                .await
                .map_err(|_| unauthorized())?;

        let state = Arc::<AppState>::from_ref(state);

        if credentials.username() == state.config.admin_username
            && credentials.password() == state.config.admin_password
        {
            Ok(RequireAuth)
        } else {
            Err(unauthorized())
        }
    }
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, "Basic realm=\"hoplink\"")],
        "Unauthorized",
    )
        .into_response()
}
