//! Feedback schemas shared by the HTTP surface, the AI gateway and the store.
//!
//! Every value here is validated on construction: a `FeedbackItem` that
//! exists always has a known category, non-blank text fields and a sentiment
//! score in `[0.0, 1.0]` rounded to two decimals.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::{Validate, ValidationError, ValidationErrors};

/// Why an untyped payload could not become a schema value.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Not JSON, wrong JSON type, missing field or unknown category.
    #[error("malformed payload: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Well-formed, but one or more fields break a constraint.
    #[error("invalid fields: {0}")]
    Invalid(#[from] ValidationErrors),
}

/// Feedback category. Wire names are exactly `Bug`, `Feature`, `Pain Point`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Bug,
    Feature,
    #[serde(rename = "Pain Point")]
    PainPoint,
}

/// Rejects empty and whitespace-only strings.
fn non_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("blank");
        error.message = Some("must not be empty or whitespace".into());
        return Err(error);
    }
    Ok(())
}

/// Round to two decimals with f64 `round()` on `score * 100`.
///
/// Ties that f64 holds exactly go away from zero (`0.625 -> 0.63`). Decimal
/// ties it cannot hold, such as `0.285`, land on whichever side the stored
/// value is nearer to (`0.285 -> 0.28`).
pub fn round_score(score: f64) -> f64 {
    (score * 100.0).round() / 100.0
}

/// Unvalidated shape of a feedback item, as produced by the model or read
/// back from storage.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct FeedbackItemDraft {
    pub category: Category,
    #[validate(custom(function = "non_blank"))]
    pub summary: String,
    #[validate(range(min = 0.0, max = 1.0))]
    pub sentiment_score: f64,
    #[validate(custom(function = "non_blank"))]
    pub original_text: String,
}

/// A single categorized insight extracted from feedback text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "FeedbackItemDraft")]
pub struct FeedbackItem {
    category: Category,
    summary: String,
    sentiment_score: f64,
    original_text: String,
}

impl TryFrom<FeedbackItemDraft> for FeedbackItem {
    type Error = SchemaError;

    fn try_from(draft: FeedbackItemDraft) -> Result<Self, Self::Error> {
        draft.validate()?;

        // NaN slips through range comparisons.
        if !draft.sentiment_score.is_finite() {
            let mut errors = ValidationErrors::new();
            errors.add("sentiment_score", ValidationError::new("range"));
            return Err(SchemaError::Invalid(errors));
        }

        Ok(Self {
            category: draft.category,
            summary: draft.summary,
            sentiment_score: round_score(draft.sentiment_score),
            original_text: draft.original_text,
        })
    }
}

impl FeedbackItem {
    pub fn new(
        category: Category,
        summary: impl Into<String>,
        sentiment_score: f64,
        original_text: impl Into<String>,
    ) -> Result<Self, SchemaError> {
        Self::try_from(FeedbackItemDraft {
            category,
            summary: summary.into(),
            sentiment_score,
            original_text: original_text.into(),
        })
    }

    /// Build an item from one element of the model's JSON array.
    pub fn from_value(value: serde_json::Value) -> Result<Self, SchemaError> {
        let draft: FeedbackItemDraft = serde_json::from_value(value)?;
        Self::try_from(draft)
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn sentiment_score(&self) -> f64 {
        self.sentiment_score
    }

    pub fn original_text(&self) -> &str {
        &self.original_text
    }
}

/// Body of `POST /api/analyze`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AnalyzeRequest {
    #[validate(custom(function = "non_blank"))]
    text: String,
}

impl AnalyzeRequest {
    pub fn new(text: impl Into<String>) -> Result<Self, SchemaError> {
        let request = Self { text: text.into() };
        request.validate()?;
        Ok(request)
    }

    /// Parse and validate a raw request body, whatever its content type.
    pub fn from_slice(body: &[u8]) -> Result<Self, SchemaError> {
        let request: Self = serde_json::from_slice(body)?;
        request.validate()?;
        Ok(request)
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Body returned by `POST /api/analyze` for every outcome.
///
/// `count` always equals `items.len()`; `error` is set only on failure, in
/// which case `items` is empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyzeResponse {
    items: Vec<FeedbackItem>,
    count: usize,
    error: Option<String>,
}

impl AnalyzeResponse {
    pub fn from_items(items: Vec<FeedbackItem>) -> Self {
        let count = items.len();
        Self {
            items,
            count,
            error: None,
        }
    }

    pub fn from_error(message: impl Into<String>) -> Self {
        Self {
            items: Vec::new(),
            count: 0,
            error: Some(message.into()),
        }
    }

    pub fn items(&self) -> &[FeedbackItem] {
        &self.items
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}
