use base64::{Engine as _, engine::general_purpose};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::payment::{Party, Payment, PaymentStatus},
};

const DEFAULT_CURRENCY: &str = "USD";

/// Charge breakdown of a movement.
#[derive(Debug, Clone, Serialize)]
pub struct Charge {
    pub amount: f64,
    pub partial_amount: f64,
    pub tip: f64,
    pub tax: f64,
    pub currency: String,
}

/// Fee charged by the provider on a movement.
#[derive(Debug, Clone, Serialize)]
pub struct Fee {
    pub amount: f64,
    pub currency: String,
}

/// A payment as the provider reports it in movement history and detail.
#[derive(Debug, Clone, Serialize)]
pub struct Movement {
    pub id: String,
    pub number: String,
    pub registration_date: DateTime<Utc>,
    pub payment_date: Option<DateTime<Utc>>,
    pub cut_off_date: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub role: &'static str,
    pub category: &'static str,
    pub charge: Charge,
    pub fee: Fee,
    pub description: Option<String>,
    pub bill_description: Option<String>,
    pub status: PaymentStatus,
    pub metadata: serde_json::Value,
    pub debitor: Party,
    pub creditor: Party,
}

impl From<&Payment> for Movement {
    fn from(payment: &Payment) -> Self {
        let currency = if payment.currency.is_empty() {
            DEFAULT_CURRENCY.to_string()
        } else {
            payment.currency.clone()
        };

        Self {
            id: payment.reference.clone(),
            number: payment.number.to_string(),
            registration_date: payment.created_at,
            payment_date: payment.payment_date,
            cut_off_date: payment.cut_off_date,
            kind: "TXN-CHECKOUT",
            role: "CREDIT",
            category: "INTERBANK",
            charge: Charge {
                amount: payment.amount,
                partial_amount: payment.partial_amount.unwrap_or(payment.amount),
                tip: payment.tip.unwrap_or(0.0),
                tax: payment.tax.unwrap_or(0.0),
                currency,
            },
            fee: Fee {
                amount: payment.fee_amount.unwrap_or(0.0),
                currency: payment
                    .fee_currency
                    .clone()
                    .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            },
            description: payment.description.clone(),
            bill_description: payment.bill_description.clone(),
            status: payment.status,
            metadata: payment
                .metadata
                .clone()
                .unwrap_or_else(|| serde_json::Value::Array(Vec::new())),
            debitor: payment.debitor.clone(),
            creditor: payment.creditor.clone(),
        }
    }
}

/// Pagination block of a history request, echoed back in the response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pagination {
    pub start_date: String,
    pub end_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_next_page: Option<bool>,
    pub limit: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// A `{ id, value }` history filter.
#[derive(Debug, Clone, Deserialize)]
pub struct Filter {
    pub id: String,
    pub value: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryQuery {
    pub pagination: Option<Pagination>,
    #[serde(default)]
    pub filter: Vec<Filter>,
}

/// The history request as sent on the wire: `{ "body": { ... } }`.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryRequest {
    pub body: Option<HistoryQuery>,
}

/// Body of a successful history response.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryBody {
    pub pagination: Pagination,
    pub transactions: Vec<Movement>,
}

/// Keyset position after which the next history page starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageCursor {
    pub created_at: DateTime<Utc>,
    pub id: Uuid,
}

impl PageCursor {
    /// The cursor pointing just past `payment`.
    pub fn after(payment: &Payment) -> Self {
        Self {
            created_at: payment.created_at,
            id: payment.id,
        }
    }

    /// Opaque URL-safe token form.
    pub fn encode(&self) -> Result<String> {
        let json = sonic_rs::to_string(self)
            .map_err(|e| AppError::Internal(format!("Cursor serialization failed: {}", e)))?;
        Ok(general_purpose::URL_SAFE_NO_PAD.encode(json))
    }

    pub fn decode(token: &str) -> Result<Self> {
        let bytes = general_purpose::URL_SAFE_NO_PAD
            .decode(token)
            .map_err(|_| AppError::InvalidBody("pagination.token is not a valid cursor".to_string()))?;
        sonic_rs::from_slice(&bytes)
            .map_err(|_| AppError::InvalidBody("pagination.token is not a valid cursor".to_string()))
    }
}

/// Store-level query for one history page.
#[derive(Debug, Clone)]
pub struct MovementQuery {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub after: Option<PageCursor>,
    pub limit: i64,
}
