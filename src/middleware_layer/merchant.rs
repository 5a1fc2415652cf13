use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{
    config::Config,
    crypto::yappy_hash::constant_time_eq,
    error::{AppError, Result},
    state::AppState,
};

/// Reads a header as a non-empty string.
fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
}

/// Checks the `api-key` / `secret-key` pair against the configured merchant.
fn check_merchant(headers: &HeaderMap, config: &Config) -> Result<()> {
    let (Some(api_key), Some(secret_key)) = (
        header_str(headers, "api-key"),
        header_str(headers, "secret-key"),
    ) else {
        return Err(AppError::MissingHeaders(
            "api-key and secret-key are required".to_string(),
        ));
    };

    let api_key_ok = constant_time_eq(api_key, &config.api_key);
    let secret_key_ok = constant_time_eq(secret_key, &config.secret_key);

    if api_key_ok & secret_key_ok {
        Ok(())
    } else {
        Err(AppError::MissingHeaders(
            "merchant credentials do not match".to_string(),
        ))
    }
}

/// A middleware that requires the merchant credential headers.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `request` - The incoming request.
/// * `next` - The next middleware in the chain.
///
/// # Returns
///
/// A `Response`, or a `YP-0008` envelope when the credentials are wrong.
pub async fn require_merchant(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    tracing::debug!("🔐 Checking merchant headers...");

    if let Err(e) = check_merchant(request.headers(), &state.config) {
        return e.into_response();
    }

    next.run(request).await
}
