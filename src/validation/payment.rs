use chrono::{DateTime, Duration, Utc};
use garde::Validate;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::payment::{NewPayment, Party, PaymentStatus},
    validation::dates::{DateBound, parse_datetime},
};

/// Cutoff applied when the caller sends none.
const DEFAULT_CUT_OFF_HOURS: i64 = 24;

fn default_currency() -> String {
    "USD".to_string()
}

fn validate_amount(value: &f64, _ctx: &()) -> garde::Result {
    if value.is_finite() && *value > 0.0 {
        Ok(())
    } else {
        Err(garde::Error::new("amount must be a positive number"))
    }
}

fn validate_currency(value: &String, _ctx: &()) -> garde::Result {
    if value.chars().all(|c| c.is_ascii_uppercase()) {
        Ok(())
    } else {
        Err(garde::Error::new("currency must be an upper-case ISO 4217 code"))
    }
}

fn validate_reference(value: &Option<String>, _ctx: &()) -> garde::Result {
    match value {
        Some(reference) if reference.trim().is_empty() => {
            Err(garde::Error::new("uuid must not be blank"))
        }
        Some(reference) if reference.len() > 128 => {
            Err(garde::Error::new("uuid must be at most 128 characters"))
        }
        Some(reference) if reference.contains(['/', '?', '#']) => {
            Err(garde::Error::new("uuid must not contain '/', '?' or '#'"))
        }
        _ => Ok(()),
    }
}

/// Body of `POST /api/internal/create-payment`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePaymentRequest {
    /// Provider-facing reference; generated when absent.
    #[serde(default, rename = "uuid")]
    #[garde(custom(validate_reference))]
    pub reference: Option<String>,

    #[garde(custom(validate_amount))]
    pub amount: f64,

    #[serde(default = "default_currency")]
    #[garde(length(min = 3, max = 3), custom(validate_currency))]
    pub currency: String,

    #[serde(default)]
    #[garde(length(max = 500))]
    pub description: Option<String>,

    #[serde(default)]
    #[garde(skip)]
    pub status: Option<String>,

    #[serde(default)]
    #[garde(skip)]
    pub payment_date: Option<String>,

    #[serde(default)]
    #[garde(skip)]
    pub cut_off_date: Option<String>,
}

impl CreatePaymentRequest {
    /// Validates the request and turns it into a row to insert.
    pub fn into_new_payment(self, now: DateTime<Utc>) -> Result<NewPayment> {
        self.validate()
            .map_err(|report| AppError::Validation(report.to_string()))?;

        let status = match self.status.as_deref() {
            Some(s) => s.parse::<PaymentStatus>()?,
            None => PaymentStatus::Pending,
        };

        let payment_date = self
            .payment_date
            .as_deref()
            .map(|s| {
                parse_datetime(s, DateBound::Start)
                    .ok_or_else(|| AppError::Validation(format!("payment_date is not a date: {}", s)))
            })
            .transpose()?;

        let cut_off_date = match self.cut_off_date.as_deref() {
            Some(s) => parse_datetime(s, DateBound::Start)
                .ok_or_else(|| AppError::Validation(format!("cut_off_date is not a date: {}", s)))?,
            None => now + Duration::hours(DEFAULT_CUT_OFF_HOURS),
        };

        let reference = self
            .reference
            .map(|r| r.trim().to_string())
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        Ok(NewPayment {
            id: Uuid::new_v4(),
            reference,
            amount: self.amount,
            currency: self.currency,
            description: self.description,
            status,
            created_at: now,
            payment_date,
            cut_off_date,
            debitor: Party::demo_debitor(),
            creditor: Party::demo_creditor(),
        })
    }
}
