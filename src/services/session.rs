use axum::http::{HeaderMap, header::AUTHORIZATION};
use chrono::{DateTime, Utc};

use crate::{
    crypto::{
        session_token,
        yappy_hash::{constant_time_eq, daily_hash},
    },
    error::{AppError, Result},
    models::session::{Session, SessionState},
    state::AppState,
};

/// Returns the token carried by an `Authorization` header, without its
/// `Bearer ` prefix.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?.trim();
    let token = match value.strip_prefix("Bearer") {
        Some(rest) if rest.is_empty() || rest.starts_with(char::is_whitespace) => rest.trim(),
        _ => value,
    };
    (!token.is_empty()).then_some(token)
}

/// The hash a merchant must present today.
fn expected_code(state: &AppState, now: DateTime<Utc>) -> Result<String> {
    daily_hash(&state.config.api_key, &state.config.secret_key, now)
}

/// Opens a provider session after checking the daily hash.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `bearer` - The `Authorization` bearer, if sent. It must be today's hash.
/// * `code` - `body.code` of the login request.
/// * `now` - The current time.
///
/// # Returns
///
/// A `Result` containing the new OPEN `Session`.
pub async fn login(
    state: &AppState,
    bearer: Option<&str>,
    code: Option<&str>,
    now: DateTime<Utc>,
) -> Result<Session> {
    let expected = expected_code(state, now)?;

    if let Some(bearer) = bearer {
        if !constant_time_eq(bearer, &expected) {
            return Err(AppError::MissingHeaders(
                "authorization hash does not match".to_string(),
            ));
        }
    }

    let code = code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::InvalidBody("body.code is required".to_string()))?;

    if !constant_time_eq(code, &expected) {
        return Err(AppError::InvalidHash);
    }

    open_session(state, code.to_string(), now).await
}

/// Issues a token and stores an OPEN session for it.
pub async fn open_session(state: &AppState, code: String, now: DateTime<Utc>) -> Result<Session> {
    let ttl = state.config.session_ttl();
    let token = session_token::generate_session_token(&state.config.api_key, now, ttl)?;

    let session = Session {
        token,
        code,
        state: SessionState::Open,
        open_at: now,
        closed_at: None,
        expires_at: now + ttl,
    };

    state.sessions.create(&session).await?;
    tracing::info!(
        "✅ Session opened: {}... (expires {})",
        &session.token[..12.min(session.token.len())],
        session.expires_at.to_rfc3339()
    );

    Ok(session)
}

/// Opens a session on the merchant's own behalf, as a provider client would.
pub async fn open_internal_session(state: &AppState, now: DateTime<Utc>) -> Result<Session> {
    let code = expected_code(state, now)?;
    open_session(state, code, now).await
}

/// Closes the session named by `token`, if any.
pub async fn logout(state: &AppState, token: Option<&str>, now: DateTime<Utc>) -> Result<()> {
    let Some(token) = token else {
        tracing::debug!("Logout without session token");
        return Ok(());
    };

    if state.sessions.close(token, now).await? {
        tracing::info!("👋 Session closed: {}...", &token[..12.min(token.len())]);
    } else {
        tracing::debug!("Logout for unknown or already closed session");
    }

    Ok(())
}

/// Resolves a bearer token to an OPEN, unexpired session.
pub async fn authorize(state: &AppState, token: &str, now: DateTime<Utc>) -> Result<Session> {
    if !session_token::is_well_formed(token) {
        return Err(AppError::InvalidSession("malformed token".to_string()));
    }

    let session = state
        .sessions
        .find_open(token)
        .await
        .map_err(|e| {
            tracing::error!("❌ Session lookup failed: {}", e);
            AppError::InvalidSession("session lookup failed".to_string())
        })?
        .ok_or_else(|| AppError::InvalidSession("unknown or closed session".to_string()))?;

    if !session.is_active(now) {
        return Err(AppError::InvalidSession("session expired".to_string()));
    }

    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_prefix_is_stripped() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(bearer_token(&headers), Some("abc.def"));
    }

    #[test]
    fn bare_token_is_accepted() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("abc.def"));
        assert_eq!(bearer_token(&headers), Some("abc.def"));
    }

    #[test]
    fn empty_bearer_is_absent() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);
    }

    #[test]
    fn bearer_keyword_alone_is_absent() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer"));
        assert_eq!(bearer_token(&headers), None);
        headers.insert(AUTHORIZATION, HeaderValue::from_static("  Bearer   "));
        assert_eq!(bearer_token(&headers), None);
    }

    #[test]
    fn token_starting_with_bearer_is_kept() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearerish.token"));
        assert_eq!(bearer_token(&headers), Some("Bearerish.token"));
    }
}
