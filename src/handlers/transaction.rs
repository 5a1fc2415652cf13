use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
    response::Response,
};
use chrono::Utc;

use crate::{
    envelope::{Envelope, YappyCode},
    error::Result,
    models::session::Session,
    services::transaction as transaction_service,
    state::AppState,
};

/// Reverses a transaction.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `session` - The caller's session, when one was presented.
/// * `transaction_id` - The reference of the payment to reverse.
///
/// # Returns
///
/// A `YP-0000` envelope, or the reversal error code.
pub async fn reverse(
    State(state): State<AppState>,
    session: Option<Extension<Session>>,
    Path(transaction_id): Path<String>,
) -> Result<Response> {
    if let Some(Extension(session)) = &session {
        tracing::debug!(
            "Reversal of {} under session opened at {}",
            transaction_id,
            session.open_at.to_rfc3339()
        );
    }

    transaction_service::reverse(&state, &transaction_id, Utc::now()).await?;
    Ok(Envelope::status_only(YappyCode::Success).respond(StatusCode::OK))
}
