use async_trait::async_trait;
use chrono::{DateTime, Utc};
use deadpool_postgres::Pool;

use crate::{
    error::Result,
    models::session::Session,
    repositories::SessionRepository,
};

/// `SessionRepository` backed by the `yappy_sessions` table.
#[derive(Clone)]
pub struct PgSessionRepository {
    pool: Pool,
}

impl PgSessionRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionRepository for PgSessionRepository {
    async fn create(&self, session: &Session) -> Result<()> {
        let client = self.pool.get().await?;
        let statement = client
            .prepare_cached(
                r#"
                INSERT INTO yappy_sessions (token, code, state, open_at, closed_at, expires_at, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $4)
                "#,
            )
            .await?;
        client
            .execute(
                &statement,
                &[
                    &session.token,
                    &session.code,
                    &session.state,
                    &session.open_at,
                    &session.closed_at,
                    &session.expires_at,
                ],
            )
            .await?;
        Ok(())
    }

    async fn find_open(&self, token: &str) -> Result<Option<Session>> {
        let client = self.pool.get().await?;
        let statement = client
            .prepare_cached(
                r#"
                SELECT token, code, state, open_at, closed_at, expires_at
                FROM yappy_sessions
                WHERE token = $1 AND state = 'OPEN'
                "#,
            )
            .await?;
        let row = client.query_opt(&statement, &[&token]).await?;
        row.as_ref().map(Session::try_from).transpose()
    }

    async fn close(&self, token: &str, closed_at: DateTime<Utc>) -> Result<bool> {
        let client = self.pool.get().await?;
        let statement = client
            .prepare_cached(
                r#"
                UPDATE yappy_sessions
                SET state = 'CLOSED', closed_at = $2
                WHERE token = $1 AND state = 'OPEN'
                "#,
            )
            .await?;
        let updated = client.execute(&statement, &[&token, &closed_at]).await?;
        Ok(updated == 1)
    }
}
