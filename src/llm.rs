//! LLM provider abstraction
//!
//! The gateway only ever sees [`LlmService`]; the concrete provider is picked
//! at startup.

mod error;
mod openai;
#[cfg(test)]
pub(crate) mod testing;
mod types;

pub use error::{LlmError, LlmErrorKind};
pub use openai::{OpenAIService, DEFAULT_BASE_URL, DEFAULT_MODEL};
pub use types::{PromptTurn, TurnRole};

use async_trait::async_trait;
use std::sync::Arc;

/// Capability to produce a reply from an assembled prompt
#[async_trait]
pub trait LlmService: Send + Sync {
    /// Generate the assistant reply for `turns` (system turn first)
    async fn generate_reply(&self, turns: &[PromptTurn]) -> Result<String, LlmError>;

    /// Get the model ID
    fn model_id(&self) -> &str;
}

/// Logging wrapper for LLM services
pub struct LoggingService {
    inner: Arc<dyn LlmService>,
    model_id: String,
}

impl LoggingService {
    pub fn new(inner: Arc<dyn LlmService>) -> Self {
        let model_id = inner.model_id().to_string();
        Self { inner, model_id }
    }
}

#[async_trait]
impl LlmService for LoggingService {
    async fn generate_reply(&self, turns: &[PromptTurn]) -> Result<String, LlmError> {
        let start = std::time::Instant::now();
        let result = self.inner.generate_reply(turns).await;
        let duration = start.elapsed();

        match &result {
            Ok(reply) => {
                tracing::info!(
                    model = %self.model_id,
                    duration_ms = %duration.as_millis(),
                    prompt_turns = turns.len(),
                    reply_chars = reply.chars().count(),
                    "LLM request completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    model = %self.model_id,
                    duration_ms = %duration.as_millis(),
                    kind = e.kind.as_str(),
                    error = %e.message,
                    transient = e.kind.is_transient(),
                    "LLM request failed"
                );
            }
        }

        result
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}
