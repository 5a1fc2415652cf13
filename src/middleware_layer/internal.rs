use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{
    crypto::yappy_hash::constant_time_eq,
    error::{AppError, InternalError},
    services::session::bearer_token,
    state::AppState,
};

/// A middleware guarding the internal API with `SECURITY_TOKEN`.
///
/// When no token is configured the internal API is open.
pub async fn require_internal_token(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let Some(expected) = state.config.security_token.as_ref() else {
        return next.run(request).await;
    };

    let authorized = bearer_token(request.headers())
        .map(|token| constant_time_eq(token, expected))
        .unwrap_or(false);

    if !authorized {
        return InternalError(AppError::Unauthorized).into_response();
    }

    next.run(request).await
}
