//! Application startup and lifecycle management.

use crate::config::FeedbackConfig;
use crate::services::{Database, FeedbackAnalyzer, GeminiAnalyzer};
use crate::{build_router, AppState};
use anyhow::anyhow;
use service_core::error::AppError;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Connect the store, migrate it, build the analyzer and bind the listener.
    ///
    /// Every failure here happens before any request can be accepted.
    pub async fn build(config: FeedbackConfig) -> Result<Self, AppError> {
        let db = Database::connect(&config.database).await.map_err(|e| {
            tracing::error!("Failed to connect to SQLite: {}", e);
            e
        })?;

        db.run_migrations().await.map_err(|e| {
            tracing::error!("Failed to run database migrations: {}", e);
            e
        })?;

        let analyzer = GeminiAnalyzer::new(config.gemini.clone()).map_err(|e| {
            tracing::error!("Failed to initialize Gemini analyzer: {}", e);
            AppError::ConfigError(anyhow!("{}", e))
        })?;
        tracing::info!(model = %analyzer.model(), "Gemini analyzer ready");
        let analyzer: Arc<dyn FeedbackAnalyzer> = Arc::new(analyzer);

        Self::with_state(AppState {
            config,
            db,
            analyzer,
        })
        .await
    }

    /// Bind a listener for already assembled state.
    pub async fn with_state(state: AppState) -> Result<Self, AppError> {
        let addr = state.config.common.socket_addr();
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!(port, "feedback-service listening");

        Ok(Self {
            port,
            listener,
            state,
        })
    }

    /// Get the HTTP port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Serve until Ctrl+C or SIGTERM, letting in-flight requests finish.
    pub async fn run_until_stopped(self) -> Result<(), AppError> {
        let router = build_router(self.state);

        axum::serve(self.listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| {
                tracing::error!("HTTP server error: {}", e);
                AppError::from(e)
            })
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
