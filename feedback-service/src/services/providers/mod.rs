//! AI analyzer abstraction and implementations.
//!
//! Everything provider-specific lives behind [`FeedbackAnalyzer`]: swapping
//! Gemini for another backend means adding one implementation here; the
//! routes only ever see validated [`FeedbackItem`]s.

pub mod gemini;
pub mod mock;

use crate::models::FeedbackItem;
use async_trait::async_trait;
use thiserror::Error;

pub use gemini::GeminiAnalyzer;
pub use mock::MockAnalyzer;

/// Fixed instruction sent with every analysis request.
pub const SYSTEM_PROMPT: &str = r#"You are a customer feedback analyst. Your job is to read raw customer feedback and extract structured insights.

You MUST respond with ONLY a valid JSON array. No markdown, no explanation, no code fences - just the raw JSON array.

Each element in the array must be a JSON object with EXACTLY these fields:
- "category": one of "Bug", "Feature", or "Pain Point"
- "summary": a concise one-sentence summary of the feedback item (string)
- "sentiment_score": a float between 0.0 (very negative) and 1.0 (very positive)
- "original_text": the verbatim excerpt from the input that this item is based on (string)

Rules:
1. Split compound feedback into multiple items if needed.
2. Bugs are defects or broken functionality.
3. Features are requests for new or improved capabilities.
4. Pain Points are frustrations or usability issues that aren't clearly bugs or feature requests.
5. sentiment_score reflects the emotional tone of the original text, not your opinion of the issue.
6. If the input contains no actionable feedback, return an empty array: []

Example output:
[
  {
    "category": "Bug",
    "summary": "The login button does not respond on mobile devices.",
    "sentiment_score": 0.1,
    "original_text": "The login button is completely broken on my phone."
  }
]"#;

/// Characters of raw model output kept in log lines.
const LOG_PREVIEW_CHARS: usize = 200;

/// Failure to turn feedback text into items. The message is shown to callers.
#[derive(Error, Debug)]
pub enum AiServiceError {
    #[error("AI provider not configured: {0}")]
    NotConfigured(String),

    #[error("AI provider error: {0}")]
    ApiError(String),

    #[error("AI provider error: rate limited")]
    RateLimited,

    #[error("AI provider error: response blocked by content filter")]
    ContentFiltered,

    #[error("AI provider error: {0}")]
    NetworkError(String),

    #[error("AI returned invalid JSON: {0}")]
    InvalidJson(String),

    #[error("AI response must be a JSON array.")]
    NotAnArray,
}

/// Turns raw feedback text into validated items.
#[async_trait]
pub trait FeedbackAnalyzer: Send + Sync {
    async fn analyze(&self, text: &str) -> Result<Vec<FeedbackItem>, AiServiceError>;
}

/// Remove a surrounding markdown code fence, with or without a language tag.
///
/// Text that does not start with a fence is returned trimmed and otherwise
/// untouched.
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    let inner = match inner.find("```") {
        Some(end) => &inner[..end],
        None => inner,
    };

    // A language tag is a single bare word directly after the opening fence.
    let tag_len = inner
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
        .unwrap_or(inner.len());
    let after_tag = &inner[tag_len..];
    let inner = if tag_len > 0 && (after_tag.is_empty() || after_tag.starts_with(char::is_whitespace)) {
        after_tag
    } else if let Some(rest) = inner.strip_prefix("json") {
        rest
    } else {
        inner
    };

    inner.trim()
}

/// Normalize raw model output into items.
///
/// The whole call fails if the text is not a JSON array; individual elements
/// that do not validate are logged and skipped.
pub fn parse_feedback_items(raw: &str) -> Result<Vec<FeedbackItem>, AiServiceError> {
    let body = strip_code_fence(raw);

    let value: serde_json::Value = serde_json::from_str(body).map_err(|e| {
        tracing::error!(
            raw = %log_preview(body),
            error = %e,
            "AI returned invalid JSON"
        );
        AiServiceError::InvalidJson(e.to_string())
    })?;

    let serde_json::Value::Array(entries) = value else {
        tracing::error!(raw = %log_preview(body), "AI response is not a JSON array");
        return Err(AiServiceError::NotAnArray);
    };

    let total = entries.len();
    let items: Vec<FeedbackItem> = entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match FeedbackItem::from_value(entry) {
            Ok(item) => Some(item),
            Err(e) => {
                tracing::warn!(index, error = %e, "Skipping malformed feedback item");
                None
            }
        })
        .collect();

    tracing::info!(
        parsed = items.len(),
        skipped = total - items.len(),
        "Parsed feedback items from AI response"
    );

    Ok(items)
}

fn log_preview(raw: &str) -> &str {
    match raw.char_indices().nth(LOG_PREVIEW_CHARS) {
        Some((cut, _)) => &raw[..cut],
        None => raw,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;

    const ONE_ITEM: &str = r#"[{"category": "Bug", "summary": "Login fails.", "sentiment_score": 0.1, "original_text": "Login is broken."}]"#;

    #[test]
    fn plain_json_is_untouched() {
        assert_eq!(strip_code_fence(ONE_ITEM), ONE_ITEM);
        assert_eq!(strip_code_fence("  []\n"), "[]");
    }

    #[test]
    fn fence_with_language_tag_is_stripped() {
        let fenced = format!("```json\n{}\n```", ONE_ITEM);
        assert_eq!(strip_code_fence(&fenced), ONE_ITEM);
    }

    #[test]
    fn fence_without_tag_is_stripped() {
        assert_eq!(strip_code_fence("```\n[]\n```"), "[]");
    }

    #[test]
    fn tag_glued_to_payload_is_stripped() {
        assert_eq!(strip_code_fence("```json[]```"), "[]");
    }

    #[test]
    fn unterminated_fence_is_stripped() {
        assert_eq!(strip_code_fence("```json\n[]"), "[]");
    }

    #[test]
    fn fenced_output_parses() {
        let items = parse_feedback_items(&format!("```json\n{}\n```", ONE_ITEM)).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].category(), Category::Bug);
    }

    #[test]
    fn empty_array_is_success() {
        assert!(parse_feedback_items("[]").unwrap().is_empty());
    }

    #[test]
    fn non_json_is_an_error() {
        let err = parse_feedback_items("Sorry, I cannot help with that.").unwrap_err();
        assert!(matches!(err, AiServiceError::InvalidJson(_)));
        assert!(err.to_string().starts_with("AI returned invalid JSON"));
    }

    #[test]
    fn json_object_is_an_error() {
        let err = parse_feedback_items(r#"{"items": []}"#).unwrap_err();
        assert!(matches!(err, AiServiceError::NotAnArray));
    }

    #[test]
    fn malformed_elements_are_skipped() {
        let raw = r#"[
            {"category": "Bug", "summary": "Crash.", "sentiment_score": 0.2, "original_text": "It crashes."},
            {"category": "Feature", "sentiment_score": 0.7, "original_text": "Dark mode please."},
            {"category": "Complaint", "summary": "x", "sentiment_score": 0.5, "original_text": "x"},
            {"category": "Pain Point", "summary": "Slow.", "sentiment_score": 1.5, "original_text": "So slow."},
            "not an object",
            {"category": "Pain Point", "summary": "Slow checkout.", "sentiment_score": 0.33333, "original_text": "Checkout is slow."}
        ]"#;

        let items = parse_feedback_items(raw).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].summary(), "Crash.");
        assert_eq!(items[1].category(), Category::PainPoint);
        assert_eq!(items[1].sentiment_score(), 0.33);
    }
}
