//! Deterministic analyzer for tests and local runs without a credential.

use super::{parse_feedback_items, AiServiceError, FeedbackAnalyzer};
use crate::models::{Category, FeedbackItem};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

enum Behavior {
    Fixed,
    Raw(String),
    Fail(String),
}

/// Mock analyzer.
pub struct MockAnalyzer {
    behavior: Behavior,
    calls: AtomicUsize,
}

impl MockAnalyzer {
    /// Always returns one `Bug` and one `Feature` item.
    pub fn new() -> Self {
        Self::with_behavior(Behavior::Fixed)
    }

    /// Pretends the model replied with `raw`, which then goes through the
    /// same normalization as a real reply.
    pub fn with_raw_response(raw: impl Into<String>) -> Self {
        Self::with_behavior(Behavior::Raw(raw.into()))
    }

    /// Every call fails as if the provider were unreachable.
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_behavior(Behavior::Fail(message.into()))
    }

    fn with_behavior(behavior: Behavior) -> Self {
        Self {
            behavior,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of `analyze` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn fixed_items() -> Result<Vec<FeedbackItem>, AiServiceError> {
        let items = [
            (
                Category::Bug,
                "Login button is broken.",
                0.1,
                "The login button is broken.",
            ),
            (
                Category::Feature,
                "User wants dark mode.",
                0.6,
                "I wish there was dark mode.",
            ),
        ];

        items
            .into_iter()
            .map(|(category, summary, score, original)| {
                FeedbackItem::new(category, summary, score, original)
                    .map_err(|e| AiServiceError::ApiError(e.to_string()))
            })
            .collect()
    }
}

impl Default for MockAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FeedbackAnalyzer for MockAnalyzer {
    async fn analyze(&self, _text: &str) -> Result<Vec<FeedbackItem>, AiServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        match &self.behavior {
            Behavior::Fixed => Self::fixed_items(),
            Behavior::Raw(raw) => parse_feedback_items(raw),
            Behavior::Fail(message) => Err(AiServiceError::ApiError(message.clone())),
        }
    }
}
