use chrono::{DateTime, Utc};
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use tokio_postgres::Row;
use uuid::Uuid;

use crate::error::AppError;

/// Lifecycle state of a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSql, FromSql)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[postgres(name = "payment_status")]
pub enum PaymentStatus {
    #[postgres(name = "PENDING")]
    Pending,
    #[postgres(name = "COMPLETED")]
    Completed,
    #[postgres(name = "REVERSED")]
    Reversed,
    #[postgres(name = "FAILED")]
    Failed,
}

impl PaymentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Completed => "COMPLETED",
            PaymentStatus::Reversed => "REVERSED",
            PaymentStatus::Failed => "FAILED",
        }
    }

    /// FAILED and REVERSED accept no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, PaymentStatus::Failed | PaymentStatus::Reversed)
    }

    /// Whether the state machine allows moving from `self` to `next`.
    pub fn can_transition_to(self, next: PaymentStatus) -> bool {
        matches!(
            (self, next),
            (PaymentStatus::Pending, PaymentStatus::Completed)
                | (PaymentStatus::Pending, PaymentStatus::Failed)
                | (PaymentStatus::Pending, PaymentStatus::Reversed)
                | (PaymentStatus::Completed, PaymentStatus::Reversed)
        )
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(PaymentStatus::Pending),
            "COMPLETED" => Ok(PaymentStatus::Completed),
            "REVERSED" => Ok(PaymentStatus::Reversed),
            "FAILED" => Ok(PaymentStatus::Failed),
            other => Err(AppError::Validation(format!(
                "status must be one of PENDING, COMPLETED, REVERSED, FAILED (got {})",
                other
            ))),
        }
    }
}

/// Display data for one side of a payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    pub alias: String,
    pub complete_name: String,
    pub alias_type: String,
    pub bank_name: String,
}

impl Party {
    /// The demo customer every payment is attributed to.
    pub fn demo_debitor() -> Self {
        Self {
            alias: "+50761234567".to_string(),
            complete_name: "Juan Pérez".to_string(),
            alias_type: "P".to_string(),
            bank_name: "Banco General".to_string(),
        }
    }

    /// The merchant receiving every payment.
    pub fn demo_creditor() -> Self {
        Self {
            alias: "merchant-yappy".to_string(),
            complete_name: "Merchant Yappy API".to_string(),
            alias_type: "E".to_string(),
            bank_name: "Banco General".to_string(),
        }
    }
}

/// A persisted payment.
#[derive(Debug, Clone, Serialize)]
pub struct Payment {
    pub id: Uuid,
    /// Provider-facing transaction id.
    #[serde(rename = "uuid")]
    pub reference: String,
    pub number: i64,
    pub amount: f64,
    pub currency: String,
    pub description: Option<String>,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub payment_date: Option<DateTime<Utc>>,
    pub cut_off_date: DateTime<Utc>,
    pub partial_amount: Option<f64>,
    pub tip: Option<f64>,
    pub tax: Option<f64>,
    pub fee_amount: Option<f64>,
    pub fee_currency: Option<String>,
    pub bill_description: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub debitor: Party,
    pub creditor: Party,
    pub qr_code_data: Option<String>,
}

impl TryFrom<&Row> for Payment {
    type Error = AppError;

    fn try_from(row: &Row) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            reference: row.try_get("reference")?,
            number: row.try_get("number")?,
            amount: row.try_get("amount")?,
            currency: row.try_get("currency")?,
            description: row.try_get("description")?,
            status: row.try_get("status")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            payment_date: row.try_get("payment_date")?,
            cut_off_date: row.try_get("cut_off_date")?,
            partial_amount: row.try_get("partial_amount")?,
            tip: row.try_get("tip")?,
            tax: row.try_get("tax")?,
            fee_amount: row.try_get("fee_amount")?,
            fee_currency: row.try_get("fee_currency")?,
            bill_description: row.try_get("bill_description")?,
            metadata: row.try_get("metadata")?,
            debitor: Party {
                alias: row.try_get("debitor_alias")?,
                complete_name: row.try_get("debitor_complete_name")?,
                alias_type: row.try_get("debitor_alias_type")?,
                bank_name: row.try_get("debitor_bank_name")?,
            },
            creditor: Party {
                alias: row.try_get("creditor_alias")?,
                complete_name: row.try_get("creditor_complete_name")?,
                alias_type: row.try_get("creditor_alias_type")?,
                bank_name: row.try_get("creditor_bank_name")?,
            },
            qr_code_data: row.try_get("qr_code_data")?,
        })
    }
}

/// Fields supplied when a payment is first stored.
#[derive(Debug, Clone)]
pub struct NewPayment {
    pub id: Uuid,
    pub reference: String,
    pub amount: f64,
    pub currency: String,
    pub description: Option<String>,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub payment_date: Option<DateTime<Utc>>,
    pub cut_off_date: DateTime<Utc>,
    pub debitor: Party,
    pub creditor: Party,
}
