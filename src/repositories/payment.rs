use async_trait::async_trait;
use chrono::{DateTime, Utc};
use deadpool_postgres::Pool;
use tokio_postgres::error::SqlState;
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::{
        movement::MovementQuery,
        payment::{NewPayment, Payment, PaymentStatus},
    },
    repositories::PaymentRepository,
};

const INSERT_PAYMENT: &str = r#"
    INSERT INTO payments (
        id, reference, amount, currency, description, status,
        created_at, updated_at, payment_date, cut_off_date,
        debitor_alias, debitor_complete_name, debitor_alias_type, debitor_bank_name,
        creditor_alias, creditor_complete_name, creditor_alias_type, creditor_bank_name
    )
    VALUES ($1, $2, $3, $4, $5, $6, $7, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
    RETURNING *
"#;

const SET_QR_CODE: &str = r#"
    UPDATE payments
    SET qr_code_data = $2, updated_at = NOW()
    WHERE id = $1
    RETURNING *
"#;

const FIND_BY_REFERENCE: &str = r#"
    SELECT *
    FROM payments
    WHERE reference = $1
"#;

const TRANSITION_STATUS: &str = r#"
    UPDATE payments
    SET status = $3,
        updated_at = $4,
        payment_date = CASE
            WHEN $3 = 'COMPLETED'::payment_status THEN COALESCE(payment_date, $4)
            ELSE payment_date
        END
    WHERE reference = $1 AND status = $2
"#;

const LIST_MOVEMENTS: &str = r#"
    SELECT *
    FROM payments
    WHERE created_at >= $1
      AND created_at <= $2
      AND ($3::timestamptz IS NULL OR (created_at, id) < ($3::timestamptz, $4::uuid))
    ORDER BY created_at DESC, id DESC
    LIMIT $5
"#;

/// `PaymentRepository` backed by the `payments` table.
#[derive(Clone)]
pub struct PgPaymentRepository {
    pool: Pool,
}

impl PgPaymentRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PaymentRepository for PgPaymentRepository {
    async fn insert(&self, payment: NewPayment) -> Result<Payment> {
        let client = self.pool.get().await?;
        let statement = client.prepare_cached(INSERT_PAYMENT).await?;
        let row = client
            .query_one(
                &statement,
                &[
                    &payment.id,
                    &payment.reference,
                    &payment.amount,
                    &payment.currency,
                    &payment.description,
                    &payment.status,
                    &payment.created_at,
                    &payment.payment_date,
                    &payment.cut_off_date,
                    &payment.debitor.alias,
                    &payment.debitor.complete_name,
                    &payment.debitor.alias_type,
                    &payment.debitor.bank_name,
                    &payment.creditor.alias,
                    &payment.creditor.complete_name,
                    &payment.creditor.alias_type,
                    &payment.creditor.bank_name,
                ],
            )
            .await
            .map_err(|e| {
                if e.code() == Some(&SqlState::UNIQUE_VIOLATION) {
                    AppError::Validation(format!(
                        "a payment with reference {} already exists",
                        payment.reference
                    ))
                } else {
                    AppError::Database(e)
                }
            })?;

        Payment::try_from(&row)
    }

    async fn set_qr_code(&self, id: Uuid, qr_code_data: &str) -> Result<Payment> {
        let client = self.pool.get().await?;
        let statement = client.prepare_cached(SET_QR_CODE).await?;
        let row = client
            .query_opt(&statement, &[&id, &qr_code_data])
            .await?
            .ok_or(AppError::NotFound)?;

        Payment::try_from(&row)
    }

    async fn find_by_reference(&self, reference: &str) -> Result<Option<Payment>> {
        let client = self.pool.get().await?;
        let statement = client.prepare_cached(FIND_BY_REFERENCE).await?;
        let row = client.query_opt(&statement, &[&reference]).await?;
        row.as_ref().map(Payment::try_from).transpose()
    }

    async fn transition_status(
        &self,
        reference: &str,
        from: PaymentStatus,
        to: PaymentStatus,
        at: DateTime<Utc>,
    ) -> Result<bool> {
        let client = self.pool.get().await?;
        let statement = client.prepare_cached(TRANSITION_STATUS).await?;
        let updated = client
            .execute(&statement, &[&reference, &from, &to, &at])
            .await?;
        Ok(updated == 1)
    }

    async fn list_movements(&self, query: &MovementQuery) -> Result<Vec<Payment>> {
        let client = self.pool.get().await?;
        let statement = client.prepare_cached(LIST_MOVEMENTS).await?;
        let after_created_at = query.after.map(|c| c.created_at);
        let after_id = query.after.map(|c| c.id);
        let rows = client
            .query(
                &statement,
                &[&query.from, &query.to, &after_created_at, &after_id, &query.limit],
            )
            .await?;

        rows.iter().map(Payment::try_from).collect()
    }
}
