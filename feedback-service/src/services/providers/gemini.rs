//! Gemini implementation of [`FeedbackAnalyzer`].
//!
//! One `generateContent` call per analysis, no retries. The reply text is
//! handed to [`parse_feedback_items`] for normalization.

use super::{parse_feedback_items, AiServiceError, FeedbackAnalyzer, SYSTEM_PROMPT};
use crate::config::GeminiConfig;
use crate::models::FeedbackItem;
use async_trait::async_trait;
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Gemini text analyzer.
pub struct GeminiAnalyzer {
    config: GeminiConfig,
    client: Client,
}

impl std::fmt::Debug for GeminiAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiAnalyzer")
            .field("model", &self.config.model)
            .field("api_base", &self.config.api_base)
            .finish()
    }
}

impl GeminiAnalyzer {
    /// Build the analyzer. Fails immediately when no API key is configured so
    /// the process never starts serving without a credential.
    pub fn new(config: GeminiConfig) -> Result<Self, AiServiceError> {
        if !config.has_api_key() {
            return Err(AiServiceError::NotConfigured(
                "GEMINI_API_KEY environment variable is not set".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                AiServiceError::NotConfigured(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { config, client })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn api_url(&self, method: &str) -> String {
        format!(
            "{}/models/{}:{}",
            self.config.api_base.trim_end_matches('/'),
            self.config.model,
            method
        )
    }

    fn build_request(&self, text: &str) -> GenerateContentRequest {
        GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: vec![ContentPart {
                    text: SYSTEM_PROMPT.to_string(),
                }],
            },
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![ContentPart {
                    text: text.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: self.config.temperature,
            },
        }
    }

    /// Call the model and return its raw reply text.
    async fn generate(&self, text: &str) -> Result<String, AiServiceError> {
        let request = self.build_request(text);

        tracing::info!(
            model = %self.config.model,
            chars = text.chars().count(),
            "Sending feedback to Gemini"
        );

        let response = self
            .client
            .post(self.api_url("generateContent"))
            .query(&[("key", self.config.api_key.expose_secret().as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                // reqwest errors embed the URL, which carries the key.
                let e = e.without_url();
                tracing::error!(error = %e, "Gemini request failed");
                AiServiceError::NetworkError(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %error_text, "Gemini API returned an error");

            if status.as_u16() == 429 {
                return Err(AiServiceError::RateLimited);
            }

            // The body stays in the log; callers only see the status.
            return Err(AiServiceError::ApiError(format!("Gemini API error {}", status)));
        }

        let api_response: GenerateContentResponse = response.json().await.map_err(|e| {
            AiServiceError::ApiError(format!("Failed to parse response: {}", e.without_url()))
        })?;

        let candidate = api_response
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| AiServiceError::ApiError("Gemini returned no candidates".to_string()))?;

        if candidate.finish_reason.as_deref() == Some("SAFETY") {
            return Err(AiServiceError::ContentFiltered);
        }

        let raw: String = candidate
            .content
            .map(|c| c.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default();

        if raw.trim().is_empty() {
            return Err(AiServiceError::ApiError(
                "Gemini returned an empty response".to_string(),
            ));
        }

        tracing::debug!(raw = %raw, "Raw AI response");
        Ok(raw)
    }
}

#[async_trait]
impl FeedbackAnalyzer for GeminiAnalyzer {
    async fn analyze(&self, text: &str) -> Result<Vec<FeedbackItem>, AiServiceError> {
        let raw = self.generate(text).await?;
        parse_feedback_items(&raw)
    }
}

// ============================================================================
// Gemini API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    system_instruction: Content,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<ContentPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ContentPart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}
