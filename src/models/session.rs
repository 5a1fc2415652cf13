use chrono::{DateTime, Utc};
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;

use crate::error::AppError;

/// Whether a provider session still authorizes calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSql, FromSql)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[postgres(name = "session_state")]
pub enum SessionState {
    #[postgres(name = "OPEN")]
    Open,
    #[postgres(name = "CLOSED")]
    Closed,
}

/// A provider session opened by a successful login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// The JWE-shaped token handed to the caller.
    pub token: String,
    /// The daily hash presented at login.
    pub code: String,
    pub state: SessionState,
    pub open_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// OPEN and not yet expired at `now`.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.state == SessionState::Open && now <= self.expires_at
    }
}

impl TryFrom<&Row> for Session {
    type Error = AppError;

    fn try_from(row: &Row) -> Result<Self, Self::Error> {
        Ok(Self {
            token: row.try_get("token")?,
            code: row.try_get("code")?,
            state: row.try_get("state")?,
            open_at: row.try_get("open_at")?,
            closed_at: row.try_get("closed_at")?,
            expires_at: row.try_get("expires_at")?,
        })
    }
}
