//! Mock transport for tests

use super::{ChatTransport, TransportError};
use crate::api::ChatRequest;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// Transport that answers from a queue.
///
/// With nothing queued it replies `"Mock response to: <message>"`. A gated
/// mock holds every exchange until [`MockTransport::release`] is called.
#[derive(Default)]
pub struct MockTransport {
    replies: Mutex<VecDeque<Result<String, TransportError>>>,
    requests: Mutex<Vec<ChatRequest>>,
    gate: Option<Arc<Notify>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gated() -> Self {
        Self {
            gate: Some(Arc::new(Notify::new())),
            ..Self::default()
        }
    }

    pub fn queue_reply(&self, reply: impl Into<String>) {
        self.replies.lock().unwrap().push_back(Ok(reply.into()));
    }

    pub fn queue_error(&self, error: TransportError) {
        self.replies.lock().unwrap().push_back(Err(error));
    }

    /// Let one held exchange finish
    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.notify_one();
        }
    }

    pub fn recorded_requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatTransport for MockTransport {
    async fn exchange(&self, request: &ChatRequest) -> Result<String, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        let queued = self.replies.lock().unwrap().pop_front();
        queued.unwrap_or_else(|| Ok(format!("Mock response to: {}", request.message)))
    }
}
