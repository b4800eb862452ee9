//! `POST /api/analyze`: validate, ask the model, persist, respond.

use crate::error::AnalyzeError;
use crate::models::{AnalyzeRequest, AnalyzeResponse};
use crate::AppState;
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    Json,
};
use tracing::instrument;

/// The body is parsed as JSON whatever its declared content type. A body
/// that cannot be buffered (over the size limit) still gets the analyze
/// response shape.
#[instrument(skip(state, body))]
pub async fn analyze(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<AnalyzeResponse>, AnalyzeError> {
    let body = body.map_err(|e| {
        tracing::info!(status = %e.status(), error = %e, "Rejected analyze body");
        e
    })?;

    let request = AnalyzeRequest::from_slice(&body).map_err(|e| {
        tracing::info!(error = %e, "Rejected analyze request");
        e
    })?;

    let items = state.analyzer.analyze(request.text()).await.map_err(|e| {
        tracing::error!(error = %e, "Feedback analysis failed");
        e
    })?;

    tracing::info!(count = items.len(), "Feedback analyzed");

    // A lost history entry must not cost the caller their result.
    if let Err(e) = state.db.create_run(request.text(), &items).await {
        tracing::error!(error = %e, "Failed to persist analysis run");
    }

    Ok(Json(AnalyzeResponse::from_items(items)))
}
