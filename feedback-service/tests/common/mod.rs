//! Shared setup for feedback-service integration tests.
//!
//! Every test gets its own in-memory store and a [`MockAnalyzer`], so tests
//! never touch the network or each other's data.

#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use feedback_service::{
    build_router,
    config::{CorsConfig, DatabaseConfig, FeedbackConfig, GeminiConfig},
    services::{Database, MockAnalyzer},
    AppState,
};
use secrecy::Secret;
use serde_json::Value;
use std::sync::{Arc, Once};
use tower::ServiceExt;

static TRACING: Once = Once::new();

pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("error"));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .init();
    });
}

pub fn test_config() -> FeedbackConfig {
    FeedbackConfig {
        common: service_core::config::Config {
            host: "127.0.0.1".parse().unwrap(),
            port: 0,
        },
        log_level: "error".to_string(),
        otlp_endpoint: None,
        database: DatabaseConfig::in_memory(),
        gemini: GeminiConfig {
            api_key: Secret::new("test-key".to_string()),
            model: "gemini-test".to_string(),
            api_base: "http://127.0.0.1:9/v1beta".to_string(),
            temperature: 0.2,
            timeout_secs: 5,
        },
        cors: CorsConfig {
            allowed_origins: vec!["*".to_string()],
        },
    }
}

/// Router over a fresh store, plus handles to inspect what happened.
pub struct TestApp {
    pub state: AppState,
    pub analyzer: Arc<MockAnalyzer>,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_analyzer(MockAnalyzer::new()).await
    }

    pub async fn with_analyzer(analyzer: MockAnalyzer) -> Self {
        init_tracing();

        let config = test_config();
        let db = Database::connect(&config.database)
            .await
            .expect("Failed to open in-memory store");
        db.run_migrations().await.expect("Failed to run migrations");

        let analyzer = Arc::new(analyzer);
        let state = AppState {
            config,
            db,
            analyzer: analyzer.clone(),
        };

        Self { state, analyzer }
    }

    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    pub async fn post_raw(&self, uri: &str, body: impl Into<String>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.into()))
            .unwrap();
        self.send(request).await
    }

    pub async fn post_json(&self, uri: &str, body: &Value) -> (StatusCode, Value) {
        self.post_raw(uri, body.to_string()).await
    }

    /// Run one successful analysis so it lands in history.
    pub async fn analyze(&self, text: &str) -> Value {
        let (status, body) = self
            .post_json("/api/analyze", &serde_json::json!({ "text": text }))
            .await;
        assert_eq!(status, StatusCode::OK, "analyze failed: {}", body);
        body
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }
}
