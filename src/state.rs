use std::sync::Arc;
use crate::config::Config;
use crate::error::Result;
use crate::repositories::{
    PaymentRepository, SessionRepository,
    payment::PgPaymentRepository,
    session::PgSessionRepository,
};

/// The application's state.
#[derive(Clone)]
pub struct AppState {
    /// Payment storage.
    pub payments: Arc<dyn PaymentRepository>,
    /// Provider session storage.
    pub sessions: Arc<dyn SessionRepository>,
    /// The application's configuration.
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates a new `AppState` backed by PostgreSQL and applies the schema.
    ///
    /// # Arguments
    ///
    /// * `config` - The application's configuration.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `AppState`.
    pub async fn new(config: &Config) -> Result<Self> {
        let db = crate::db::create_pool(&config.database_url)?;
        tracing::info!("✅ PostgreSQL Pool initialized with deadpool-postgres");

        crate::db::run_migrations(&db).await?;

        Ok(Self::with_repositories(
            config.clone(),
            Arc::new(PgPaymentRepository::new(db.clone())),
            Arc::new(PgSessionRepository::new(db)),
        ))
    }

    /// Assembles a state from explicit repositories.
    pub fn with_repositories(
        config: Config,
        payments: Arc<dyn PaymentRepository>,
        sessions: Arc<dyn SessionRepository>,
    ) -> Self {
        Self {
            payments,
            sessions,
            config: Arc::new(config),
        }
    }
}
