//! Database service for feedback-service.
//!
//! Append-only store of analysis runs. Each run is written with a single
//! `INSERT ... RETURNING`, so it is either fully visible or absent.

use crate::config::DatabaseConfig;
use crate::models::{AnalysisRun, AnalysisRunRow, FeedbackItem};
use chrono::Utc;
use service_core::error::AppError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, instrument};

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Create a new connection pool.
    ///
    /// An in-memory URL gets exactly one connection that is never recycled,
    /// since every SQLite memory connection is its own database.
    #[instrument(skip(config), fields(service = "feedback-service"))]
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, AppError> {
        let options = SqliteConnectOptions::from_str(&config.url)
            .map_err(|e| AppError::ConfigError(anyhow::anyhow!("Invalid DATABASE_URL: {}", e)))?
            .create_if_missing(true);

        let pool_options = if config.is_in_memory() {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new()
                .max_connections(config.max_connections)
                .min_connections(config.min_connections)
                .idle_timeout(Duration::from_secs(600))
        };

        info!(
            in_memory = config.is_in_memory(),
            max_connections = config.max_connections,
            "Connecting to SQLite"
        );

        let pool = pool_options
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(options)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to connect: {}", e)))?;

        info!("SQLite connection pool established");

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Check database health.
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Health check failed: {}", e)))?;
        Ok(())
    }

    /// Run database migrations.
    #[instrument(skip(self))]
    pub async fn run_migrations(&self) -> Result<(), AppError> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Migration failed: {}", e)))?;
        info!("Database migrations completed");
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Analysis Runs
    // -------------------------------------------------------------------------

    /// Record one analysis and return it as stored.
    #[instrument(skip(self, input_text, items), fields(item_count = items.len()))]
    pub async fn create_run(
        &self,
        input_text: &str,
        items: &[FeedbackItem],
    ) -> Result<AnalysisRun, AppError> {
        let result_items = serde_json::to_string(items).map_err(|e| {
            AppError::InternalError(anyhow::anyhow!("Failed to serialize items: {}", e))
        })?;

        let row = sqlx::query_as::<_, AnalysisRunRow>(
            r#"
            INSERT INTO analysis_runs (input_text, result_items, item_count, created_at)
            VALUES (?, ?, ?, ?)
            RETURNING id, input_text, result_items, item_count, created_at
            "#,
        )
        .bind(input_text)
        .bind(&result_items)
        .bind(items.len() as i64)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to create run: {}", e)))?;

        let run = decode_run(row)?;

        info!(run_id = run.id, item_count = run.item_count, "Analysis run created");

        Ok(run)
    }

    /// Most recent runs first; ties on `created_at` go to the higher id.
    #[instrument(skip(self))]
    pub async fn list_runs(&self, limit: i64) -> Result<Vec<AnalysisRun>, AppError> {
        let rows = sqlx::query_as::<_, AnalysisRunRow>(
            r#"
            SELECT id, input_text, result_items, item_count, created_at
            FROM analysis_runs
            ORDER BY created_at DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list runs: {}", e)))?;

        rows.into_iter().map(decode_run).collect()
    }
}

fn decode_run(row: AnalysisRunRow) -> Result<AnalysisRun, AppError> {
    let id = row.id;
    AnalysisRun::try_from(row).map_err(|e| {
        AppError::DatabaseError(anyhow::anyhow!(
            "Stored items for run {} are invalid: {}",
            id,
            e
        ))
    })
}
