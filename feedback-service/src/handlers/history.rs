//! `GET /api/history`: most recent analysis runs.

use crate::models::RunSummary;
use crate::AppState;
use anyhow::anyhow;
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use serde::Deserialize;
use service_core::error::AppError;

pub const DEFAULT_LIMIT: i64 = 20;
pub const MAX_LIMIT: i64 = 100;

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    limit: Option<String>,
}

/// Out of range limits are clamped rather than rejected.
pub fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

fn parse_limit(raw: Option<&str>) -> Result<i64, AppError> {
    let parsed = match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(value) => Some(value.parse::<i64>().map_err(|_| {
            AppError::BadRequest(anyhow!("'limit' must be an integer, got '{}'", value))
        })?),
        None => None,
    };

    Ok(clamp_limit(parsed))
}

pub async fn history(
    State(state): State<AppState>,
    params: Result<Query<HistoryParams>, QueryRejection>,
) -> Result<Json<Vec<RunSummary>>, AppError> {
    let Query(params) =
        params.map_err(|e| AppError::BadRequest(anyhow!("Invalid query string: {}", e)))?;
    let limit = parse_limit(params.limit.as_deref())?;

    let runs = state.db.list_runs(limit).await.map_err(|e| {
        tracing::error!(error = %e, limit, "Failed to list analysis runs");
        e
    })?;

    tracing::debug!(limit, returned = runs.len(), "History listed");

    Ok(Json(runs.iter().map(|run| run.summary()).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_limit_uses_default() {
        assert_eq!(clamp_limit(None), DEFAULT_LIMIT);
        assert_eq!(parse_limit(None).unwrap(), DEFAULT_LIMIT);
        assert_eq!(parse_limit(Some("")).unwrap(), DEFAULT_LIMIT);
    }

    #[test]
    fn limit_is_clamped_into_range() {
        assert_eq!(clamp_limit(Some(0)), 1);
        assert_eq!(clamp_limit(Some(-5)), 1);
        assert_eq!(clamp_limit(Some(50)), 50);
        assert_eq!(clamp_limit(Some(1000)), MAX_LIMIT);
    }

    #[test]
    fn non_numeric_limit_is_a_bad_request() {
        assert!(matches!(parse_limit(Some("abc")), Err(AppError::BadRequest(_))));
        assert!(matches!(parse_limit(Some("2.5")), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        assert_eq!(parse_limit(Some(" 7 ")).unwrap(), 7);
    }
}
