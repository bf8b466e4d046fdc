//! `OpenAI` chat-completions provider implementation

use super::types::{PromptTurn, TurnRole};
use super::{LlmError, LlmService};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
const TEMPERATURE: f32 = 0.7;

/// OpenAI-compatible chat-completions service
pub struct OpenAIService {
    client: Client,
    api_key: String,
    model: String,
    endpoint: String,
}

impl OpenAIService {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::unknown(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            model: model.into(),
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
        })
    }

    pub(crate) fn translate_request(&self, turns: &[PromptTurn]) -> OpenAIRequest {
        OpenAIRequest {
            model: self.model.clone(),
            messages: turns
                .iter()
                .map(|t| OpenAIMessage {
                    role: t.role.as_str().to_string(),
                    content: Some(t.content.clone()),
                })
                .collect(),
            temperature: TEMPERATURE,
        }
    }

    /// Pull the reply text out of a decoded response.
    ///
    /// A response without choices, or whose first choice has no content, is
    /// malformed rather than an empty reply.
    pub(crate) fn normalize_response(resp: OpenAIResponse) -> Result<String, LlmError> {
        let choice = resp
            .choices
            .and_then(|choices| choices.into_iter().next())
            .ok_or_else(|| LlmError::malformed("No choices in response"))?;

        if choice.message.role.as_deref().is_some_and(|r| r != TurnRole::Assistant.as_str()) {
            tracing::warn!(role = ?choice.message.role, "Unexpected role in provider reply");
        }

        match choice.message.content {
            Some(text) if !text.trim().is_empty() => Ok(text),
            Some(_) => Err(LlmError::malformed("Empty content in first choice")),
            None => Err(LlmError::malformed("Missing content in first choice")),
        }
    }
}

#[async_trait]
impl LlmService for OpenAIService {
    async fn generate_reply(&self, turns: &[PromptTurn]) -> Result<String, LlmError> {
        let request = self.translate_request(turns);

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::network(format!("Request timeout: {e}"))
                } else if e.is_connect() {
                    LlmError::network(format!("Connection failed: {e}"))
                } else {
                    LlmError::unknown(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| LlmError::network(format!("Failed to read response body: {e}")))?;

        if !status.is_success() {
            return Err(LlmError::from_status(status.as_u16(), &body));
        }

        let parsed: OpenAIResponse = serde_json::from_str(&body)
            .map_err(|e| LlmError::malformed(format!("Failed to parse response: {e}")))?;

        Self::normalize_response(parsed)
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
pub(crate) struct OpenAIRequest {
    pub model: String,
    pub messages: Vec<OpenAIMessage>,
    pub temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct OpenAIMessage {
    #[serde(default)]
    pub role: String,
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAIResponse {
    pub choices: Option<Vec<OpenAIChoice>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAIChoice {
    pub message: OpenAIReplyMessage,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAIReplyMessage {
    pub role: Option<String>,
    pub content: Option<String>,
}
