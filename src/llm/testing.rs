//! Mock provider for tests

use super::{LlmError, LlmService, PromptTurn};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Mock LLM service that returns queued replies.
///
/// With nothing queued it echoes the last user turn as
/// `"Mock response to: <text>"`.
pub struct MockLlmService {
    replies: Mutex<VecDeque<Result<String, LlmError>>>,
    model_id: String,
    /// Record of all prompts received
    pub prompts: Mutex<Vec<Vec<PromptTurn>>>,
}

impl MockLlmService {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            model_id: model_id.into(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful reply
    pub fn queue_reply(&self, reply: impl Into<String>) {
        self.replies.lock().unwrap().push_back(Ok(reply.into()));
    }

    /// Queue a failure
    pub fn queue_error(&self, error: LlmError) {
        self.replies.lock().unwrap().push_back(Err(error));
    }

    /// Get recorded prompts
    pub fn recorded_prompts(&self) -> Vec<Vec<PromptTurn>> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmService for MockLlmService {
    async fn generate_reply(&self, turns: &[PromptTurn]) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(turns.to_vec());
        let queued = self.replies.lock().unwrap().pop_front();
        queued.unwrap_or_else(|| {
            let last = turns.last().map_or("", |t| t.content.as_str());
            Ok(format!("Mock response to: {last}"))
        })
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}
