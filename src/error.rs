use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::{
    envelope::{Envelope, YappyCode, json_response},
    models::payment::PaymentStatus,
};

/// Why a reversal was refused.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReversalError {
    /// No payment carries the requested reference.
    #[error("transaction not found")]
    NotFound,

    /// The cutoff date has passed and the payment is settled.
    #[error("transaction already settled")]
    Settled,

    /// The payment is in the FAILED state.
    #[error("transaction is in a failed state")]
    FailedState,

    /// The payment was already reversed.
    #[error("transaction already reversed")]
    AlreadyReversed,

    /// The store refused or lost the update.
    #[error("reversal aborted: {0}")]
    Aborted(String),
}

/// The application's error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// A database error.
    #[error("Database error: {0}")]
    Database(#[from] tokio_postgres::Error),

    /// A connection pool error.
    #[error("Pool error: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),

    /// The HTTP method is not served by the route.
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// Merchant credentials are missing or wrong.
    #[error("Missing or invalid merchant headers: {0}")]
    MissingHeaders(String),

    /// The login code does not match today's hash.
    #[error("Invalid authentication code")]
    InvalidHash,

    /// The request body is missing fields or has invalid values.
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    /// The session token is unknown, closed or expired.
    #[error("Invalid session: {0}")]
    InvalidSession(String),

    /// The history page size is outside the accepted range.
    #[error("Limit out of range: {0}")]
    LimitOutOfRange(i64),

    /// Too many collection aliases in a history filter.
    #[error("Too many aliases: {0}")]
    TooManyAliases(usize),

    /// A reversal was refused.
    #[error("Reversal refused: {0}")]
    Reversal(#[from] ReversalError),

    /// A status change that the payment state machine forbids.
    #[error("Cannot move payment from {from} to {to}")]
    InvalidTransition {
        from: PaymentStatus,
        to: PaymentStatus,
    },

    /// A bearer token for the internal API is missing or wrong.
    #[error("Authorization failed")]
    Unauthorized,

    /// A resource not found error.
    #[error("Resource not found")]
    NotFound,

    /// A validation error.
    #[error("Validation error: {0}")]
    Validation(String),

    /// QR rendering failed.
    #[error("QR code error: {0}")]
    QrCode(String),

    /// Storing the rendered QR code on its payment failed.
    #[error("Error updating payment with QR code: {0}")]
    QrUpdate(#[source] Box<AppError>),

    /// An internal server error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

/// A `Result` type that uses `AppError` as the error type.
pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    /// Logs the error at a level matching its severity.
    fn log(&self) {
        match self {
            AppError::Database(e) => tracing::error!("Database error: {}", e),
            AppError::Pool(e) => tracing::error!("Pool error: {}", e),
            AppError::QrCode(msg) => tracing::error!("QR code error: {}", msg),
            AppError::QrUpdate(e) => tracing::error!("QR code update failed: {}", e),
            AppError::Internal(msg) => tracing::error!("Internal error: {}", msg),
            AppError::Reversal(ReversalError::Aborted(msg)) => {
                tracing::error!("Reversal aborted: {}", msg)
            }
            AppError::MissingHeaders(msg) => tracing::warn!("Merchant headers rejected: {}", msg),
            AppError::InvalidHash => tracing::warn!("Login code rejected"),
            AppError::InvalidSession(msg) => tracing::warn!("Session rejected: {}", msg),
            AppError::Unauthorized => tracing::warn!("Authorization failed"),
            other => tracing::debug!("Request refused: {}", other),
        }
    }

    /// The HTTP status and provider code for the provider API.
    pub fn provider_status(&self) -> (StatusCode, YappyCode) {
        match self {
            AppError::MethodNotAllowed => (StatusCode::METHOD_NOT_ALLOWED, YappyCode::ProcessingError),
            AppError::MissingHeaders(_) | AppError::Unauthorized => {
                (StatusCode::UNAUTHORIZED, YappyCode::MissingHeaders)
            }
            AppError::InvalidHash => (StatusCode::UNAUTHORIZED, YappyCode::InvalidHash),
            AppError::InvalidBody(_) | AppError::Validation(_) => {
                (StatusCode::BAD_REQUEST, YappyCode::InvalidBody)
            }
            AppError::InvalidSession(_) => (StatusCode::UNAUTHORIZED, YappyCode::InvalidSession),
            AppError::LimitOutOfRange(_) => (StatusCode::BAD_REQUEST, YappyCode::LimitOutOfRange),
            AppError::TooManyAliases(_) => (StatusCode::BAD_REQUEST, YappyCode::TooManyAliases),
            AppError::Reversal(reason) => match reason {
                ReversalError::NotFound => (StatusCode::BAD_REQUEST, YappyCode::ReversalFailed),
                ReversalError::Settled => (StatusCode::BAD_REQUEST, YappyCode::AlreadySettled),
                ReversalError::FailedState => (StatusCode::BAD_REQUEST, YappyCode::FailedTransaction),
                ReversalError::AlreadyReversed => {
                    (StatusCode::BAD_REQUEST, YappyCode::ReversedTransaction)
                }
                ReversalError::Aborted(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, YappyCode::ReversalFailed)
                }
            },
            AppError::NotFound => (StatusCode::OK, YappyCode::NoData),
            AppError::InvalidTransition { .. } => (StatusCode::BAD_REQUEST, YappyCode::ProcessingError),
            AppError::Database(_)
            | AppError::Pool(_)
            | AppError::QrCode(_)
            | AppError::QrUpdate(_)
            | AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, YappyCode::ServiceTimeout),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.log();
        let (status, code) = self.provider_status();
        Envelope::status_only(code).respond(status)
    }
}

/// Error body of the internal API: `{ "error": ..., "details": ... }`.
#[derive(Debug, Serialize)]
struct InternalErrorBody {
    error: &'static str,
    details: String,
}

/// Wraps an `AppError` raised on an internal route.
#[derive(Debug)]
pub struct InternalError(pub AppError);

impl From<AppError> for InternalError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl IntoResponse for InternalError {
    fn into_response(self) -> Response {
        let err = self.0;
        err.log();

        let (status, error, details) = match &err {
            AppError::Validation(msg) | AppError::InvalidBody(msg) => {
                (StatusCode::BAD_REQUEST, "Invalid payment data", msg.clone())
            }
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "Unauthorized",
                "Missing or invalid bearer token".to_string(),
            ),
            AppError::NotFound => (
                StatusCode::NOT_FOUND,
                "Payment not found",
                "No payment carries this reference".to_string(),
            ),
            AppError::InvalidTransition { .. } => {
                (StatusCode::CONFLICT, "Invalid payment status", err.to_string())
            }
            AppError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                "Method Not Allowed",
                "Method Not Allowed".to_string(),
            ),
            AppError::Database(_) | AppError::Pool(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error saving payment to database",
                err.to_string(),
            ),
            AppError::QrUpdate(source) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error updating payment with QR code",
                source.to_string(),
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal Server Error",
                err.to_string(),
            ),
        };

        json_response(status, &InternalErrorBody { error, details })
    }
}
