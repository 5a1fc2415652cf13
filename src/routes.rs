use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    routing::{get, post, put},
};
use http::{HeaderName, HeaderValue, Method, header};
use tower_governor::governor::GovernorConfigBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::{
    config::Config,
    error::{AppError, Result},
    handlers::{
        collection,
        internal::{self, internal_method_not_allowed, provider_method_not_allowed},
        movement, session, transaction,
    },
    middleware_layer,
    state::AppState,
};

/// Largest request body accepted.
const BODY_LIMIT: usize = 1024 * 1024;
/// One provider request replenished per period, per client IP.
const RATE_LIMIT_PERIOD_MS: u64 = 100;
const RATE_LIMIT_BURST: u32 = 50;

fn cors(config: &Config) -> CorsLayer {
    let allow_origin = if config.cors_origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(parse_origins(config))
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
            HeaderName::from_static("api-key"),
            HeaderName::from_static("secret-key"),
        ])
        .max_age(Duration::from_secs(86400))
}

fn parse_origins(config: &Config) -> Vec<HeaderValue> {
    config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("⚠️  Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect()
}

/// Builds the application router.
///
/// Guards are attached to each method router with `route_layer`, so a
/// request with an unsupported method is answered by the method fallback
/// before any credential check runs. Provider routes sit behind the merchant
/// credential check and a per-IP rate limit; the routes past login also
/// validate a presented session. Internal routes sit behind the
/// `SECURITY_TOKEN` guard.
pub fn router(state: AppState) -> Result<Router> {
    let merchant = from_fn_with_state(
        state.clone(),
        middleware_layer::merchant::require_merchant,
    );
    let session_guard = from_fn_with_state(
        state.clone(),
        middleware_layer::session::validate_session,
    );
    let internal_guard = from_fn_with_state(
        state.clone(),
        middleware_layer::internal::require_internal_token,
    );

    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_millisecond(RATE_LIMIT_PERIOD_MS)
            .burst_size(RATE_LIMIT_BURST)
            .use_headers()
            .finish()
            .ok_or_else(|| AppError::Internal("Invalid rate limiter configuration".to_string()))?,
    );

    let provider_routes = Router::new()
        .route(
            "/api/v1/session/login",
            post(session::login)
                .route_layer(merchant.clone())
                .fallback(provider_method_not_allowed),
        )
        .route(
            "/api/v1/session/logout",
            get(session::logout)
                .route_layer(merchant.clone())
                .fallback(provider_method_not_allowed),
        )
        .route(
            "/api/v1/collection-method",
            get(collection::list_collection_methods)
                .route_layer(session_guard.clone())
                .route_layer(merchant.clone())
                .fallback(provider_method_not_allowed),
        )
        .route(
            "/api/v1/movement/history",
            post(movement::history)
                .route_layer(session_guard.clone())
                .route_layer(merchant.clone())
                .fallback(provider_method_not_allowed),
        )
        .route(
            "/api/v1/movement/{transaction_id}",
            get(movement::detail)
                .route_layer(session_guard.clone())
                .route_layer(merchant.clone())
                .fallback(provider_method_not_allowed),
        )
        .route(
            "/api/v1/transaction/{transaction_id}",
            put(transaction::reverse)
                .route_layer(session_guard)
                .route_layer(merchant)
                .fallback(provider_method_not_allowed),
        )
        .layer(tower_governor::GovernorLayer::new(governor_conf))
        .with_state(state.clone());

    let internal_routes = Router::new()
        .route(
            "/api/internal/create-payment",
            post(internal::create_payment)
                .route_layer(internal_guard.clone())
                .fallback(internal_method_not_allowed),
        )
        .route(
            "/api/internal/payment/{reference}",
            get(internal::get_payment)
                .route_layer(internal_guard.clone())
                .fallback(internal_method_not_allowed),
        )
        .route(
            "/api/internal/payment/{reference}/complete",
            put(internal::complete_payment)
                .route_layer(internal_guard)
                .fallback(internal_method_not_allowed),
        )
        .with_state(state.clone());

    Ok(Router::new()
        .route("/health", get(internal::health))
        .merge(provider_routes)
        .merge(internal_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(false))
                .on_request(DefaultOnRequest::default().level(Level::DEBUG))
                .on_response(DefaultOnResponse::default().level(Level::DEBUG))
                .on_failure(DefaultOnFailure::default().level(Level::ERROR)),
        )
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(cors(&state.config)))
}
