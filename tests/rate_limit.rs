mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use tower::ServiceExt;

use common::{TestApp, provider};

const ATTEMPTS: usize = 100;

#[tokio::test]
async fn provider_routes_are_throttled() {
    let app = TestApp::new();
    let mut throttled = 0;

    for _ in 0..ATTEMPTS {
        let request = provider("GET", "/api/v1/collection-method")
            .body(Body::empty())
            .unwrap();
        let response = app.router.clone().oneshot(request).await.unwrap();
        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            throttled += 1;
        }
    }

    assert!(throttled > 0, "no request was throttled");
}

#[tokio::test]
async fn health_and_internal_routes_are_not_throttled() {
    let app = TestApp::new();

    for _ in 0..ATTEMPTS {
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let response = app.router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    for _ in 0..ATTEMPTS {
        let request = Request::builder()
            .uri("/api/internal/payment/missing")
            .body(Body::empty())
            .unwrap();
        let response = app.router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
