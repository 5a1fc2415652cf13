use chrono::{DateTime, Utc};

use crate::{
    error::{AppError, ReversalError, Result},
    models::payment::{Payment, PaymentStatus},
    state::AppState,
};

/// Whether `payment` may still be reversed at `now`.
///
/// Terminal states are reported before the cutoff, so a reversed payment
/// past its cutoff still answers "already reversed".
pub fn ensure_reversible(payment: &Payment, now: DateTime<Utc>) -> std::result::Result<(), ReversalError> {
    if payment.status.is_terminal() {
        return Err(match payment.status {
            PaymentStatus::Failed => ReversalError::FailedState,
            _ => ReversalError::AlreadyReversed,
        });
    }

    if now > payment.cut_off_date {
        return Err(ReversalError::Settled);
    }

    Ok(())
}

fn aborted(err: AppError) -> AppError {
    AppError::Reversal(ReversalError::Aborted(err.to_string()))
}

/// Reverses the transaction with the given reference.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `transaction_id` - The provider-facing reference.
/// * `now` - The current time, compared against the cutoff.
///
/// # Returns
///
/// A `Result<()>`.
pub async fn reverse(state: &AppState, transaction_id: &str, now: DateTime<Utc>) -> Result<()> {
    let payment = state
        .payments
        .find_by_reference(transaction_id)
        .await
        .map_err(aborted)?
        .ok_or(ReversalError::NotFound)?;

    ensure_reversible(&payment, now)?;

    let updated = state
        .payments
        .transition_status(transaction_id, payment.status, PaymentStatus::Reversed, now)
        .await
        .map_err(aborted)?;

    if !updated {
        return Err(ReversalError::Aborted(format!(
            "payment {} changed while reversing",
            transaction_id
        ))
        .into());
    }

    tracing::info!("↩️  Transaction reversed: {} (was {})", transaction_id, payment.status);
    Ok(())
}
