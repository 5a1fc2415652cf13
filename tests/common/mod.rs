#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    Extension, Router,
    body::{Body, to_bytes},
    extract::{ConnectInfo, connect_info::MockConnectInfo},
    http::{Request, StatusCode, request::Builder},
};
use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::Mutex;
use tower::ServiceExt;
use uuid::Uuid;
use zeroize::Zeroizing;

use yappy_gateway::{
    config::Config,
    crypto::yappy_hash::daily_hash,
    error::{AppError, Result},
    models::{
        movement::MovementQuery,
        payment::{NewPayment, Party, Payment, PaymentStatus},
        session::{Session, SessionState},
    },
    repositories::{PaymentRepository, SessionRepository},
    routes,
    state::AppState,
};

pub const API_KEY: &str = "ETKHX-75645671";
pub const SECRET_KEY: &str = "c2VjcmV0LWtleS1mb3ItdGVzdHM";

/// Payments kept in a vector, ordered and paged like the SQL store.
#[derive(Default)]
pub struct MemoryPayments {
    rows: Mutex<Vec<Payment>>,
}

impl MemoryPayments {
    pub async fn all(&self) -> Vec<Payment> {
        self.rows.lock().await.clone()
    }
}

#[async_trait]
impl PaymentRepository for MemoryPayments {
    async fn insert(&self, payment: NewPayment) -> Result<Payment> {
        let mut rows = self.rows.lock().await;
        if rows.iter().any(|p| p.reference == payment.reference) {
            return Err(AppError::Validation(format!(
                "a payment with reference {} already exists",
                payment.reference
            )));
        }

        let stored = Payment {
            id: payment.id,
            reference: payment.reference,
            number: rows.len() as i64 + 1,
            amount: payment.amount,
            currency: payment.currency,
            description: payment.description,
            status: payment.status,
            created_at: payment.created_at,
            updated_at: payment.created_at,
            payment_date: payment.payment_date,
            cut_off_date: payment.cut_off_date,
            partial_amount: None,
            tip: None,
            tax: None,
            fee_amount: None,
            fee_currency: None,
            bill_description: None,
            metadata: None,
            debitor: payment.debitor,
            creditor: payment.creditor,
            qr_code_data: None,
        };
        rows.push(stored.clone());
        Ok(stored)
    }

    async fn set_qr_code(&self, id: Uuid, qr_code_data: &str) -> Result<Payment> {
        let mut rows = self.rows.lock().await;
        let payment = rows
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(AppError::NotFound)?;
        payment.qr_code_data = Some(qr_code_data.to_string());
        payment.updated_at = Utc::now();
        Ok(payment.clone())
    }

    async fn find_by_reference(&self, reference: &str) -> Result<Option<Payment>> {
        let rows = self.rows.lock().await;
        Ok(rows.iter().find(|p| p.reference == reference).cloned())
    }

    async fn transition_status(
        &self,
        reference: &str,
        from: PaymentStatus,
        to: PaymentStatus,
        at: DateTime<Utc>,
    ) -> Result<bool> {
        let mut rows = self.rows.lock().await;
        let Some(payment) = rows
            .iter_mut()
            .find(|p| p.reference == reference && p.status == from)
        else {
            return Ok(false);
        };

        payment.status = to;
        payment.updated_at = at;
        if to == PaymentStatus::Completed && payment.payment_date.is_none() {
            payment.payment_date = Some(at);
        }
        Ok(true)
    }

    async fn list_movements(&self, query: &MovementQuery) -> Result<Vec<Payment>> {
        let rows = self.rows.lock().await;
        let mut page: Vec<Payment> = rows
            .iter()
            .filter(|p| p.created_at >= query.from && p.created_at <= query.to)
            .filter(|p| match query.after {
                Some(cursor) => (p.created_at, p.id) < (cursor.created_at, cursor.id),
                None => true,
            })
            .cloned()
            .collect();

        page.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        page.truncate(query.limit.max(0) as usize);
        Ok(page)
    }
}

#[derive(Default)]
pub struct MemorySessions {
    rows: Mutex<Vec<Session>>,
}

impl MemorySessions {
    pub async fn all(&self) -> Vec<Session> {
        self.rows.lock().await.clone()
    }

    pub async fn get(&self, token: &str) -> Option<Session> {
        self.rows
            .lock()
            .await
            .iter()
            .find(|s| s.token == token)
            .cloned()
    }
}

#[async_trait]
impl SessionRepository for MemorySessions {
    async fn create(&self, session: &Session) -> Result<()> {
        self.rows.lock().await.push(session.clone());
        Ok(())
    }

    async fn find_open(&self, token: &str) -> Result<Option<Session>> {
        Ok(self
            .rows
            .lock()
            .await
            .iter()
            .find(|s| s.token == token && s.state == SessionState::Open)
            .cloned())
    }

    async fn close(&self, token: &str, closed_at: DateTime<Utc>) -> Result<bool> {
        let mut rows = self.rows.lock().await;
        let Some(session) = rows
            .iter_mut()
            .find(|s| s.token == token && s.state == SessionState::Open)
        else {
            return Ok(false);
        };

        session.state = SessionState::Closed;
        session.closed_at = Some(closed_at);
        Ok(true)
    }
}

/// The application router as a client at a fixed address sees it.
pub fn app_router(state: AppState) -> Router {
    let addr = SocketAddr::from(([127, 0, 0, 1], 40000));
    routes::router(state)
        .unwrap()
        .layer(MockConnectInfo(addr))
        // The rate limiter reads the peer address from the request extensions.
        .layer(Extension(ConnectInfo(addr)))
}

/// Sends `request` through `router` and returns the status with the JSON body.
pub async fn send_to(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

pub fn test_config() -> Config {
    Config {
        database_url: "postgres://unused".to_string(),
        api_key: API_KEY.to_string(),
        secret_key: Zeroizing::new(SECRET_KEY.to_string()),
        security_token: None,
        public_base_url: "http://localhost:3000".to_string(),
        payment_url: "https://yappy.com/payment".to_string(),
        group_id: "group01".to_string(),
        device_id: "caja01".to_string(),
        session_ttl_minutes: 60,
        bind_addr: "127.0.0.1:3000".parse().unwrap(),
        static_dir: "public".to_string(),
        cors_origins: vec!["http://localhost:3000".to_string()],
    }
}

/// The full router wired to in-memory stores.
pub struct TestApp {
    pub router: Router,
    pub payments: Arc<MemoryPayments>,
    pub sessions: Arc<MemorySessions>,
    pub config: Config,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_security_token(token: &str) -> Self {
        let mut config = test_config();
        config.security_token = Some(Zeroizing::new(token.to_string()));
        Self::with_config(config)
    }

    pub fn with_config(config: Config) -> Self {
        let payments = Arc::new(MemoryPayments::default());
        let sessions = Arc::new(MemorySessions::default());
        let state = AppState::with_repositories(
            config.clone(),
            payments.clone(),
            sessions.clone(),
        );

        Self {
            router: app_router(state),
            payments,
            sessions,
            config,
        }
    }

    /// Sends a request and returns the status with the decoded JSON body.
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        send_to(&self.router, request).await
    }

    /// Logs in with today's hash and returns the session token.
    pub async fn login(&self) -> String {
        let code = today_hash();
        let (status, body) = self
            .send(
                provider("POST", "/api/v1/session/login")
                    .body(json(serde_json::json!({ "body": { "code": code } })))
                    .unwrap(),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {}", body);
        body["body"]["token"].as_str().unwrap().to_string()
    }

    /// Stores a payment directly, bypassing the internal API.
    pub async fn seed(
        &self,
        reference: &str,
        status: PaymentStatus,
        created_at: DateTime<Utc>,
        cut_off_date: DateTime<Utc>,
    ) -> Payment {
        self.payments
            .insert(NewPayment {
                id: Uuid::new_v4(),
                reference: reference.to_string(),
                amount: 12.5,
                currency: "USD".to_string(),
                description: Some(format!("Pago {}", reference)),
                status,
                created_at,
                payment_date: None,
                cut_off_date,
                debitor: Party::demo_debitor(),
                creditor: Party::demo_creditor(),
            })
            .await
            .unwrap()
    }
}

pub fn today_hash() -> String {
    daily_hash(API_KEY, SECRET_KEY, Utc::now()).unwrap()
}

/// A request builder carrying valid merchant headers.
pub fn provider(method: &str, uri: &str) -> Builder {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .header("api-key", API_KEY)
        .header("secret-key", SECRET_KEY)
}

pub fn json(value: Value) -> Body {
    Body::from(value.to_string())
}
