//! Payments created by the demo UI and the QR code that points at them.

use chrono::{DateTime, Utc};
use url::Url;

use crate::{
    config::Config,
    error::{AppError, Result},
    models::{
        collection::{CollectionMethod, CollectionType},
        payment::{Payment, PaymentStatus},
    },
    qr,
    services::{collection, session as session_service},
    state::AppState,
    validation::payment::CreatePaymentRequest,
};

/// Builds the provider's official payment URL for `payment`.
pub fn official_payment_url(
    config: &Config,
    payment: &Payment,
    method: &CollectionMethod,
) -> Result<String> {
    let group_id = method
        .detail("groupId")
        .ok_or_else(|| AppError::Internal("collection method has no groupId".to_string()))?;
    let device_id = method
        .detail("deviceId")
        .ok_or_else(|| AppError::Internal("collection method has no deviceId".to_string()))?;
    let amount = payment.amount.to_string();
    let description = payment.description.as_deref().unwrap_or_default();

    let url = Url::parse_with_params(
        &config.payment_url,
        &[
            ("merchant", config.api_key.as_str()),
            ("alias", method.alias.as_str()),
            ("amount", amount.as_str()),
            ("currency", payment.currency.as_str()),
            ("reference", payment.reference.as_str()),
            ("description", description),
            ("groupId", group_id),
            ("deviceId", device_id),
        ],
    )
    .map_err(|e| AppError::Internal(format!("Invalid YAPPY_PAYMENT_URL: {}", e)))?;

    Ok(url.into())
}

/// Link to this service's own pay page, used when the provider flow fails.
pub fn fallback_payment_url(config: &Config, payment: &Payment) -> Result<String> {
    let mut url = Url::parse(&config.public_base_url)
        .map_err(|e| AppError::Internal(format!("Invalid PUBLIC_BASE_URL: {}", e)))?;

    url.path_segments_mut()
        .map_err(|_| AppError::Internal("PUBLIC_BASE_URL cannot carry a path".to_string()))?
        .pop_if_empty()
        .push("pay")
        .push(&payment.reference);

    url.query_pairs_mut()
        .append_pair("amount", &payment.amount.to_string())
        .append_pair("currency", &payment.currency)
        .append_pair("description", payment.description.as_deref().unwrap_or_default());

    Ok(url.into())
}

/// Runs the provider flow: open a session, read the integration collection
/// method, build the official URL, close the session.
async fn provider_payment_url(state: &AppState, payment: &Payment, now: DateTime<Utc>) -> Result<String> {
    let session = session_service::open_internal_session(state, now).await?;

    let url = collection::find_method(&state.config, CollectionType::Integration)
        .ok_or_else(|| AppError::Internal("no INTEGRACION_YAPPY collection method".to_string()))
        .and_then(|method| official_payment_url(&state.config, payment, &method));

    if let Err(e) = session_service::logout(state, Some(&session.token), Utc::now()).await {
        tracing::warn!("⚠️  Could not close checkout session: {}", e);
    }

    url
}

/// The link encoded in the payment's QR code.
async fn payment_link(state: &AppState, payment: &Payment, now: DateTime<Utc>) -> Result<String> {
    match provider_payment_url(state, payment, now).await {
        Ok(url) => {
            tracing::info!("✅ Using official Yappy payment URL for {}", payment.reference);
            Ok(url)
        }
        Err(e) => {
            let url = fallback_payment_url(&state.config, payment)?;
            tracing::warn!("⚠️  Falling back to local payment URL ({}): {}", e, url);
            Ok(url)
        }
    }
}

/// Stores a payment and attaches its QR code.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `request` - The create-payment body.
/// * `now` - Creation time.
///
/// # Returns
///
/// A `Result` containing the stored `Payment` with `qr_code_data` set.
pub async fn create_payment(
    state: &AppState,
    request: CreatePaymentRequest,
    now: DateTime<Utc>,
) -> Result<Payment> {
    let new_payment = request.into_new_payment(now)?;
    let payment = state.payments.insert(new_payment).await?;
    tracing::info!("💳 Payment stored: {} ({} {})", payment.reference, payment.amount, payment.currency);

    let link = payment_link(state, &payment, now).await?;
    let qr_code_data = match qr::to_data_url(&link) {
        Ok(data) => data,
        Err(e) => {
            tracing::error!("❌ QR generation failed, retrying with fallback URL: {}", e);
            qr::to_data_url(&fallback_payment_url(&state.config, &payment)?)?
        }
    };

    state
        .payments
        .set_qr_code(payment.id, &qr_code_data)
        .await
        .map_err(|e| AppError::QrUpdate(Box::new(e)))
}

/// Loads a payment for the pay page.
pub async fn get_payment(state: &AppState, reference: &str) -> Result<Payment> {
    state
        .payments
        .find_by_reference(reference)
        .await?
        .ok_or(AppError::NotFound)
}

/// Confirms a pending payment.
pub async fn complete_payment(state: &AppState, reference: &str, now: DateTime<Utc>) -> Result<Payment> {
    let payment = get_payment(state, reference).await?;
    let to = PaymentStatus::Completed;

    if !payment.status.can_transition_to(to) {
        return Err(AppError::InvalidTransition { from: payment.status, to });
    }

    if !state
        .payments
        .transition_status(reference, payment.status, to, now)
        .await?
    {
        return Err(AppError::InvalidTransition { from: payment.status, to });
    }

    tracing::info!("✅ Payment completed: {}", reference);
    get_payment(state, reference).await
}
