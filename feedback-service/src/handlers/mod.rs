//! HTTP handlers for feedback-service.

pub mod analyze;
pub mod health;
pub mod history;

use anyhow::anyhow;
use service_core::error::AppError;

pub use analyze::analyze;
pub use health::{health_check, readiness_check};
pub use history::history;

/// Any path outside the route table.
pub async fn not_found() -> AppError {
    AppError::NotFound(anyhow!("Not found"))
}

/// A known path hit with a method it does not serve.
pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
