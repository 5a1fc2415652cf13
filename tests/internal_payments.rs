mod common;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use chrono::{DateTime, Utc};
use serde_json::{Value, json};
use uuid::Uuid;
use yappy_gateway::{
    error::{AppError, Result},
    models::{
        movement::MovementQuery,
        payment::{NewPayment, Payment, PaymentStatus},
        session::SessionState,
    },
    repositories::PaymentRepository,
    state::AppState,
};

use common::{MemoryPayments, MemorySessions, TestApp};

/// Stores payments but refuses to attach QR codes.
#[derive(Default)]
struct QrRejectingPayments {
    inner: MemoryPayments,
}

#[async_trait]
impl PaymentRepository for QrRejectingPayments {
    async fn insert(&self, payment: NewPayment) -> Result<Payment> {
        self.inner.insert(payment).await
    }

    async fn set_qr_code(&self, _id: Uuid, _qr_code_data: &str) -> Result<Payment> {
        Err(AppError::Internal("connection reset".to_string()))
    }

    async fn find_by_reference(&self, reference: &str) -> Result<Option<Payment>> {
        self.inner.find_by_reference(reference).await
    }

    async fn transition_status(
        &self,
        reference: &str,
        from: PaymentStatus,
        to: PaymentStatus,
        at: DateTime<Utc>,
    ) -> Result<bool> {
        self.inner.transition_status(reference, from, to, at).await
    }

    async fn list_movements(&self, query: &MovementQuery) -> Result<Vec<Payment>> {
        self.inner.list_movements(query).await
    }
}

fn create(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/internal/create-payment")
        .header("content-type", "application/json")
        .body(common::json(body))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn create_payment_attaches_a_qr_code() {
    let app = TestApp::new();

    let (status, body) = app
        .send(create(json!({
            "uuid": "order-1001",
            "amount": 25.5,
            "currency": "USD",
            "description": "Pedido 1001"
        })))
        .await;

    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["uuid"], "order-1001");
    assert_eq!(body["status"], "PENDING");
    assert_eq!(body["amount"], 25.5);
    assert_eq!(body["debitor"]["complete_name"], "Juan Pérez");
    assert!(
        body["qr_code_data"]
            .as_str()
            .unwrap()
            .starts_with("data:image/png;base64,")
    );

    let stored = app.payments.all().await;
    assert_eq!(stored.len(), 1);
    assert!(stored[0].qr_code_data.is_some());
}

#[tokio::test]
async fn checkout_session_is_closed_afterwards() {
    let app = TestApp::new();

    let (status, _) = app.send(create(json!({ "amount": 3.0 }))).await;
    assert_eq!(status, StatusCode::OK);

    let sessions = app.sessions.all().await;
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].state, SessionState::Closed);
    assert_eq!(sessions[0].code, common::today_hash());
}

#[tokio::test]
async fn invalid_amount_is_a_bad_request() {
    let app = TestApp::new();

    let (status, body) = app.send(create(json!({ "amount": -1.0 }))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
    assert!(body["details"].is_string());
    assert!(app.payments.all().await.is_empty());
}

#[tokio::test]
async fn unknown_status_is_a_bad_request() {
    let app = TestApp::new();

    let (status, _) = app
        .send(create(json!({ "amount": 1.0, "status": "LOST" })))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn duplicate_reference_is_rejected() {
    let app = TestApp::new();
    let request = json!({ "uuid": "dup-1", "amount": 1.0 });

    let (status, _) = app.send(create(request.clone())).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.send(create(request)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn payment_can_be_read_and_completed() {
    let app = TestApp::new();
    app.send(create(json!({ "uuid": "order-2", "amount": 9.99 })))
        .await;

    let (status, body) = app.send(get("/api/internal/payment/order-2")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "PENDING");
    assert!(body["payment_date"].is_null());

    let complete = Request::builder()
        .method("PUT")
        .uri("/api/internal/payment/order-2/complete")
        .body(Body::empty())
        .unwrap();
    let (status, body) = app.send(complete).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "COMPLETED");
    assert!(body["payment_date"].is_string());

    let again = Request::builder()
        .method("PUT")
        .uri("/api/internal/payment/order-2/complete")
        .body(Body::empty())
        .unwrap();
    let (status, _) = app.send(again).await;
    assert_eq!(status, StatusCode::CONFLICT);

    assert_eq!(app.payments.all().await[0].status, PaymentStatus::Completed);
}

#[tokio::test]
async fn unknown_payment_is_not_found() {
    let app = TestApp::new();

    let (status, body) = app.send(get("/api/internal/payment/missing")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Payment not found");
}

#[tokio::test]
async fn wrong_method_on_internal_route() {
    let app = TestApp::new();

    let (status, body) = app.send(get("/api/internal/create-payment")).await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["error"], "Method Not Allowed");
}

#[tokio::test]
async fn security_token_guards_internal_routes() {
    let app = TestApp::with_security_token("s3cret");

    let (status, body) = app.send(create(json!({ "amount": 1.0 }))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized");

    let request = Request::builder()
        .method("POST")
        .uri("/api/internal/create-payment")
        .header("authorization", "Bearer s3cret")
        .body(common::json(json!({ "amount": 1.0 })))
        .unwrap();
    let (status, _) = app.send(request).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn health_is_open() {
    let app = TestApp::with_security_token("s3cret");

    let (status, body) = app.send(get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn wrong_method_is_answered_before_the_token_check() {
    let app = TestApp::with_security_token("s3cret");

    let (status, body) = app.send(get("/api/internal/create-payment")).await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["error"], "Method Not Allowed");
}

#[tokio::test]
async fn failed_qr_update_is_reported_as_such() {
    let state = AppState::with_repositories(
        common::test_config(),
        Arc::new(QrRejectingPayments::default()),
        Arc::new(MemorySessions::default()),
    );
    let router = common::app_router(state);

    let (status, body) = common::send_to(&router, create(json!({ "amount": 4.0 }))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Error updating payment with QR code");
    assert!(body["details"].as_str().unwrap().contains("connection reset"));
}
