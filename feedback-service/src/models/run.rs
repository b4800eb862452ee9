//! Persisted analysis runs and their public history summary.

use super::FeedbackItem;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// Number of characters of the input kept in a history preview.
pub const PREVIEW_CHARS: usize = 120;

/// Raw `analysis_runs` row.
#[derive(Debug, Clone, FromRow)]
pub struct AnalysisRunRow {
    pub id: i64,
    pub input_text: String,
    pub result_items: String,
    pub item_count: i64,
    pub created_at: DateTime<Utc>,
}

/// One recorded analysis: the input text, the items it produced and when.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRun {
    pub id: i64,
    pub input_text: String,
    pub result_items: Vec<FeedbackItem>,
    pub item_count: i64,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<AnalysisRunRow> for AnalysisRun {
    type Error = serde_json::Error;

    fn try_from(row: AnalysisRunRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            input_text: row.input_text,
            result_items: serde_json::from_str(&row.result_items)?,
            item_count: row.item_count,
            created_at: row.created_at,
        })
    }
}

impl AnalysisRun {
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            id: self.id,
            input_preview: preview(&self.input_text),
            item_count: self.item_count,
            items: self.result_items.clone(),
            created_at: self.created_at,
        }
    }
}

/// History entry returned by `GET /api/history`.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub id: i64,
    pub input_preview: String,
    pub item_count: i64,
    pub items: Vec<FeedbackItem>,
    pub created_at: DateTime<Utc>,
}

/// First [`PREVIEW_CHARS`] characters of `text`, with `…` appended when cut.
pub fn preview(text: &str) -> String {
    match text.char_indices().nth(PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}…", &text[..cut]),
        None => text.to_string(),
    }
}
