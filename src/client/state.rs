//! Conversation state and messages

use crate::api::HistoryEntry;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

pub const GREETING: &str = "Hello! I'm Cogfusion.ai. How can I help you today?";
pub const APOLOGY: &str = "Sorry, I encountered an error. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// What a message is, independent of its text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Greeting,
    Turn,
    FailureNotice,
}

/// One entry in the conversation. Never mutated once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub text: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub kind: MessageKind,
}

impl Message {
    /// Whether this message is sent upstream as context
    pub fn is_context(&self) -> bool {
        self.kind == MessageKind::Turn
    }

    pub fn to_history_entry(&self) -> HistoryEntry {
        HistoryEntry {
            role: self.role.as_str().to_string(),
            content: self.text.clone(),
        }
    }
}

/// Produces message ids unique within the process.
///
/// A monotonic counter guarantees uniqueness; the random suffix keeps ids
/// from different processes apart.
#[derive(Debug, Default)]
pub struct MessageIdGenerator {
    counter: AtomicU64,
}

impl MessageIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        let salt: u32 = rand::random();
        format!("msg-{n:x}-{salt:08x}")
    }

    pub fn message(&self, role: Role, kind: MessageKind, text: impl Into<String>) -> Message {
        Message {
            id: self.next_id(),
            text: text.into(),
            role,
            created_at: Utc::now(),
            kind,
        }
    }

    pub fn user(&self, text: impl Into<String>) -> Message {
        self.message(Role::User, MessageKind::Turn, text)
    }

    pub fn assistant(&self, text: impl Into<String>) -> Message {
        self.message(Role::Assistant, MessageKind::Turn, text)
    }

    pub fn greeting(&self) -> Message {
        self.message(Role::Assistant, MessageKind::Greeting, GREETING)
    }

    pub fn failure_notice(&self) -> Message {
        self.message(Role::Assistant, MessageKind::FailureNotice, APOLOGY)
    }
}

/// Snapshot of a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversationState {
    pub messages: Vec<Message>,
    pub in_flight: bool,
    pub last_error: Option<String>,
    /// Bumped by every clear
    pub epoch: u64,
}

impl ConversationState {
    /// A fresh conversation holding only `greeting`
    pub fn new(greeting: Message) -> Self {
        Self {
            messages: vec![greeting],
            in_flight: false,
            last_error: None,
            epoch: 0,
        }
    }

    /// True once anything beyond the greeting has been said
    pub fn has_conversation(&self) -> bool {
        self.messages.iter().any(|m| m.kind != MessageKind::Greeting)
    }

    pub fn last_user_message(&self) -> Option<&Message> {
        self.messages.iter().rev().find(|m| m.role == Role::User)
    }

    /// Prior turns in the shape the gateway expects
    pub fn history(&self) -> Vec<HistoryEntry> {
        self.messages
            .iter()
            .filter(|m| m.is_context())
            .map(Message::to_history_entry)
            .collect()
    }

    pub fn ends_with_failure_notice(&self) -> bool {
        self.messages
            .last()
            .is_some_and(|m| m.kind == MessageKind::FailureNotice)
    }
}
