use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::Serialize;

use crate::{
    envelope::json_response,
    error::{AppError, InternalError},
    services::checkout,
    state::AppState,
    validation::payment::CreatePaymentRequest,
};

#[derive(Serialize)]
struct Health {
    status: &'static str,
}

/// Creates a payment and its QR code.
pub async fn create_payment(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, InternalError> {
    let request: CreatePaymentRequest = sonic_rs::from_slice(&body)
        .map_err(|e| AppError::InvalidBody(e.to_string()))?;

    let payment = checkout::create_payment(&state, request, Utc::now()).await?;
    Ok(json_response(StatusCode::OK, &payment))
}

/// Reads a payment by reference.
pub async fn get_payment(
    State(state): State<AppState>,
    Path(reference): Path<String>,
) -> Result<Response, InternalError> {
    let payment = checkout::get_payment(&state, &reference).await?;
    Ok(json_response(StatusCode::OK, &payment))
}

/// Marks a pending payment as completed.
pub async fn complete_payment(
    State(state): State<AppState>,
    Path(reference): Path<String>,
) -> Result<Response, InternalError> {
    let payment = checkout::complete_payment(&state, &reference, Utc::now()).await?;
    Ok(json_response(StatusCode::OK, &payment))
}

pub async fn health() -> Response {
    json_response(StatusCode::OK, &Health { status: "ok" })
}

/// `405 YP-0002` for provider routes.
pub async fn provider_method_not_allowed() -> Response {
    AppError::MethodNotAllowed.into_response()
}

/// `405 {"error": ...}` for internal routes.
pub async fn internal_method_not_allowed() -> Response {
    InternalError(AppError::MethodNotAllowed).into_response()
}
