use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::Response,
};

use crate::{
    envelope::{Envelope, YappyCode},
    error::{AppError, Result},
    models::movement::HistoryRequest,
    services::movement as movement_service,
    state::AppState,
};

/// Pages through the merchant's movements.
pub async fn history(State(state): State<AppState>, body: Bytes) -> Result<Response> {
    let request: HistoryRequest = sonic_rs::from_slice(&body)
        .map_err(|e| AppError::InvalidBody(format!("history request: {}", e)))?;

    let query = request
        .body
        .ok_or_else(|| AppError::InvalidBody("body is required".to_string()))?;

    match movement_service::history(&state, query).await? {
        Some(page) => Ok(Envelope::success(page).respond(StatusCode::OK)),
        None => Ok(Envelope::status_only(YappyCode::NoData).respond(StatusCode::OK)),
    }
}

/// Returns a single movement by transaction id.
pub async fn detail(
    State(state): State<AppState>,
    Path(transaction_id): Path<String>,
) -> Result<Response> {
    match movement_service::detail(&state, &transaction_id).await? {
        Some(movement) => Ok(Envelope::success(movement).respond(StatusCode::OK)),
        None => Ok(Envelope::status_only(YappyCode::NoData).respond(StatusCode::OK)),
    }
}
