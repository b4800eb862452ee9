pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;

use axum::{
    http::{header, HeaderValue, Method, Request},
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::middleware::{
    request_id_middleware, security_headers_middleware, REQUEST_ID_HEADER,
};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use config::{CorsConfig, FeedbackConfig};
use services::{Database, FeedbackAnalyzer};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: FeedbackConfig,
    pub db: Database,
    pub analyzer: Arc<dyn FeedbackAnalyzer>,
}

/// Assemble the `/api` routes with their middleware stack.
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors);

    Router::new()
        .route(
            "/api/health",
            get(handlers::health_check).fallback(handlers::method_not_allowed),
        )
        .route(
            "/api/ready",
            get(handlers::readiness_check).fallback(handlers::method_not_allowed),
        )
        .route(
            "/api/analyze",
            post(handlers::analyze).fallback(handlers::method_not_allowed),
        )
        .route(
            "/api/history",
            get(handlers::history).fallback(handlers::method_not_allowed),
        )
        .fallback(handlers::not_found)
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(cors)
        .with_state(state)
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origin = if config.allows_any_origin() {
        AllowOrigin::any()
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| match o.parse::<HeaderValue>() {
                Ok(value) => Some(value),
                Err(e) => {
                    tracing::error!("Invalid CORS origin '{}': {}. Skipping.", o, e);
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}
