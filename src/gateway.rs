//! Chat gateway
//!
//! Validation, then rate limiting, then the upstream call. Every failure is
//! collapsed into one of three [`GatewayError`] cases; provider detail stays
//! in the logs.

mod prompt;
mod rate_limit;
mod validate;

pub use prompt::{assemble_prompt, DEFAULT_SYSTEM_PROMPT};
pub use rate_limit::{RateDecision, RateLimitConfig, RateLimiter};
pub use validate::{
    validate, ChatInput, MAX_MESSAGE_CHARS, REASON_BLANK, REASON_HISTORY, REASON_LENGTH,
    REASON_NOT_STRING,
};

use crate::llm::LlmService;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::Instrument;

/// Normalized gateway failure
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GatewayError {
    #[error("invalid input: {}", .0.join("; "))]
    Validation(Vec<String>),
    #[error("rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64, limit: u32 },
    /// Deliberately carries nothing from the provider
    #[error("upstream failure")]
    Upstream,
}

/// Successful exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    pub reply: String,
    pub quota: RateDecision,
}

pub struct ChatGateway {
    llm: Arc<dyn LlmService>,
    limiter: Arc<RateLimiter>,
    system_prompt: String,
}

impl ChatGateway {
    pub fn new(
        llm: Arc<dyn LlmService>,
        limiter: Arc<RateLimiter>,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            llm,
            limiter,
            system_prompt: system_prompt.into(),
        }
    }

    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    pub fn model_id(&self) -> &str {
        self.llm.model_id()
    }

    /// Process one raw `POST /chat` body on behalf of `client`
    pub async fn handle(&self, raw_body: &[u8], client: &str) -> Result<ChatReply, GatewayError> {
        let request_id = uuid::Uuid::new_v4();
        let span = tracing::info_span!("chat", %request_id, client = %client);
        self.handle_inner(raw_body, client).instrument(span).await
    }

    async fn handle_inner(&self, raw_body: &[u8], client: &str) -> Result<ChatReply, GatewayError> {
        // Undecodable bodies fall through to validation as "no fields".
        let body: Value = serde_json::from_slice(raw_body).unwrap_or(Value::Null);

        let input = validate(&body).map_err(|reasons| {
            tracing::debug!(?reasons, "Rejected chat request");
            GatewayError::Validation(reasons)
        })?;

        let quota = self.limiter.check(client);
        if !quota.allowed {
            let retry_after_secs = quota.retry_after_secs.unwrap_or(1);
            tracing::warn!(retry_after_secs, limit = quota.limit, "Rate limit exceeded");
            return Err(GatewayError::RateLimited {
                retry_after_secs,
                limit: quota.limit,
            });
        }

        let prompt = assemble_prompt(&self.system_prompt, &input.history, &input.message);

        match self.llm.generate_reply(&prompt).await {
            Ok(reply) => Ok(ChatReply { reply, quota }),
            Err(e) => {
                tracing::error!(
                    kind = e.kind.as_str(),
                    error = %e.message,
                    history_turns = input.history.len(),
                    "Upstream call failed"
                );
                Err(GatewayError::Upstream)
            }
        }
    }
}
