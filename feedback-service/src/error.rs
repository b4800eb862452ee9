//! Failures of the analyze pipeline.
//!
//! Every variant renders as a normal [`AnalyzeResponse`] so callers always get
//! the same body shape.

use crate::models::{AnalyzeResponse, SchemaError};
use crate::services::AiServiceError;
use axum::{
    extract::rejection::BytesRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

pub const INVALID_REQUEST_MESSAGE: &str =
    "Invalid request: 'text' field is required and must be non-empty.";

#[derive(Debug, Error)]
pub enum AnalyzeError {
    /// The body could not be read at all, e.g. it is over the size limit.
    #[error("Unreadable request body: {0}")]
    Body(#[from] BytesRejection),

    #[error("Invalid request: {0}")]
    InvalidRequest(#[from] SchemaError),

    #[error(transparent)]
    Upstream(#[from] AiServiceError),
}

impl AnalyzeError {
    pub fn status(&self) -> StatusCode {
        match self {
            AnalyzeError::Body(rejection) => rejection.status(),
            AnalyzeError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AnalyzeError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for AnalyzeError {
    fn into_response(self) -> Response {
        let message = match &self {
            AnalyzeError::Body(rejection) => rejection.body_text(),
            AnalyzeError::InvalidRequest(_) => INVALID_REQUEST_MESSAGE.to_string(),
            AnalyzeError::Upstream(err) => err.to_string(),
        };

        (self.status(), Json(AnalyzeResponse::from_error(message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AnalyzeRequest;

    #[test]
    fn validation_failure_is_a_client_error() {
        let err = AnalyzeError::from(AnalyzeRequest::new("").unwrap_err());
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn provider_failure_is_a_bad_gateway() {
        let err = AnalyzeError::from(AiServiceError::NotAnArray);
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(err.to_string(), "AI response must be a JSON array.");
    }
}
