use std::env;
use std::net::SocketAddr;
use anyhow::{Context, Result};
use zeroize::Zeroizing;

/// The application's configuration.
#[derive(Clone)]
pub struct Config {
    /// The URL of the PostgreSQL database.
    pub database_url: String,
    /// The merchant API key (`api-key` header).
    pub api_key: String,
    /// The merchant secret key (`secret-key` header, HMAC key).
    pub secret_key: Zeroizing<String>,
    /// Bearer token guarding the internal API, if any.
    pub security_token: Option<Zeroizing<String>>,
    /// Public origin of this service, used for fallback payment links.
    pub public_base_url: String,
    /// The provider's payment page.
    pub payment_url: String,
    /// `groupId` of the integration collection method.
    pub group_id: String,
    /// `deviceId` of the integration collection method.
    pub device_id: String,
    /// Lifetime of a provider session in minutes.
    pub session_ttl_minutes: i64,
    /// Address the HTTP server binds to.
    pub bind_addr: SocketAddr,
    /// Directory of prebuilt UI assets served as fallback.
    pub static_dir: String,
    /// Origins allowed by CORS.
    pub cors_origins: Vec<String>,
}

impl Config {
    /// Creates a new `Config` from environment variables.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `Config`.
    pub fn from_env() -> Result<Self> {
        let secret_key = Zeroizing::new(
            env::var("YAPPY_COMMERCE_SECRET_KEY")
                .context("YAPPY_COMMERCE_SECRET_KEY must be set")?,
        );

        if secret_key.is_empty() {
            anyhow::bail!("YAPPY_COMMERCE_SECRET_KEY must not be empty");
        }

        let security_token = env::var("SECURITY_TOKEN")
            .ok()
            .filter(|t| !t.is_empty())
            .map(Zeroizing::new);

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .context("DATABASE_URL must be set")?,
            api_key: env::var("YAPPY_COMMERCE_API_KEY")
                .context("YAPPY_COMMERCE_API_KEY must be set")?,
            secret_key,
            security_token,
            public_base_url: env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string())
                .trim_end_matches('/')
                .to_string(),
            payment_url: env::var("YAPPY_PAYMENT_URL")
                .unwrap_or_else(|_| "https://yappy.com/payment".to_string()),
            group_id: env::var("YAPPY_GROUP_ID")
                .unwrap_or_else(|_| "group01".to_string()),
            device_id: env::var("YAPPY_DEVICE_ID")
                .unwrap_or_else(|_| "caja01".to_string()),
            session_ttl_minutes: env::var("SESSION_TTL_MINUTES")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .context("Invalid SESSION_TTL_MINUTES")?,
            bind_addr: env::var("BIND_ADDR")
                .unwrap_or_else(|_| "127.0.0.1:3000".to_string())
                .parse()
                .context("Invalid BIND_ADDR")?,
            static_dir: env::var("STATIC_DIR")
                .unwrap_or_else(|_| "public".to_string()),
            cors_origins: env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:3000,http://127.0.0.1:3000".to_string())
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect(),
        })
    }

    /// Session lifetime as a `chrono::Duration`.
    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.session_ttl_minutes)
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &self.api_key)
            .field("public_base_url", &self.public_base_url)
            .field("payment_url", &self.payment_url)
            .field("session_ttl_minutes", &self.session_ttl_minutes)
            .field("bind_addr", &self.bind_addr)
            .finish_non_exhaustive()
    }
}
