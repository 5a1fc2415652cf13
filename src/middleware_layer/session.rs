use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::Utc;

use crate::{
    services::session::{authorize, bearer_token},
    state::AppState,
};

/// A middleware that validates the session token when one is sent.
///
/// Requests without `Authorization` pass through untouched. A present
/// token must name an OPEN, unexpired session; the `Session` is then
/// inserted into the request extensions.
pub async fn validate_session(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let Some(token) = bearer_token(request.headers()).map(str::to_owned) else {
        tracing::debug!("No session token presented");
        return next.run(request).await;
    };

    match authorize(&state, &token, Utc::now()).await {
        Ok(session) => {
            tracing::debug!("✅ Session authorized, opened at {}", session.open_at.to_rfc3339());
            request.extensions_mut().insert(session);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}
