use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::Response,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    envelope::{Envelope, YappyCode},
    error::Result,
    models::session::SessionState,
    services::session::{self as session_service, bearer_token},
    state::AppState,
};

/// `body` of a login request.
#[derive(Debug, Deserialize)]
pub struct LoginBody {
    #[serde(default)]
    pub code: Option<String>,
}

/// The login request as sent on the wire: `{ "body": { "code": ... } }`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub body: Option<LoginBody>,
}

/// Body of a successful login response.
#[derive(Debug, Serialize)]
pub struct LoginResponseBody {
    pub token: String,
    pub state: SessionState,
    pub open_at: DateTime<Utc>,
}

/// Opens a provider session.
///
/// An unparseable body is treated like a body without `code`.
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response> {
    let code = sonic_rs::from_slice::<LoginRequest>(&body)
        .ok()
        .and_then(|req| req.body)
        .and_then(|b| b.code);

    let session = session_service::login(
        &state,
        bearer_token(&headers),
        code.as_deref(),
        Utc::now(),
    )
    .await?;

    Ok(Envelope::success(LoginResponseBody {
        token: session.token,
        state: session.state,
        open_at: session.open_at,
    })
    .respond(StatusCode::OK))
}

/// Closes the session carried by `Authorization`, if any.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Result<Response> {
    session_service::logout(&state, bearer_token(&headers), Utc::now()).await?;
    Ok(Envelope::status_only(YappyCode::Success).respond(StatusCode::OK))
}
