//! Storage seams for payments and provider sessions.
//!
//! Handlers and services only see these traits; `postgres` backs them in
//! production and tests plug in in-memory doubles.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    error::Result,
    models::{
        movement::MovementQuery,
        payment::{NewPayment, Payment, PaymentStatus},
        session::Session,
    },
};

pub mod payment;
pub mod session;

/// Persistence of payments.
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// Stores a new payment and returns the stored row.
    async fn insert(&self, payment: NewPayment) -> Result<Payment>;

    /// Attaches the QR data URL to a payment.
    async fn set_qr_code(&self, id: Uuid, qr_code_data: &str) -> Result<Payment>;

    /// Looks a payment up by its provider-facing reference.
    async fn find_by_reference(&self, reference: &str) -> Result<Option<Payment>>;

    /// Moves a payment from `from` to `to`. Completion also stamps
    /// `payment_date` when it is still empty.
    ///
    /// Returns `false` when the payment is no longer in `from`.
    async fn transition_status(
        &self,
        reference: &str,
        from: PaymentStatus,
        to: PaymentStatus,
        at: DateTime<Utc>,
    ) -> Result<bool>;

    /// One page of payments, newest first.
    async fn list_movements(&self, query: &MovementQuery) -> Result<Vec<Payment>>;
}

/// Persistence of provider sessions.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn create(&self, session: &Session) -> Result<()>;

    /// The session with this token if it is still OPEN.
    async fn find_open(&self, token: &str) -> Result<Option<Session>>;

    /// Closes an OPEN session. Returns `false` if none matched.
    async fn close(&self, token: &str, closed_at: DateTime<Utc>) -> Result<bool>;
}
