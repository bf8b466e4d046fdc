//! Events that drive the conversation

use super::state::Message;

#[derive(Debug, Clone)]
pub enum Event {
    // User events
    UserSubmitted {
        message: Message,
    },
    /// Resend the last user message; `message` is its fresh copy
    RetryRequested {
        message: Message,
    },
    Clear {
        greeting: Message,
    },

    // Exchange settlement, tagged with the epoch the request was sent in
    ReplyReceived {
        epoch: u64,
        message: Message,
    },
    ExchangeFailed {
        epoch: u64,
        error: String,
        notice: Message,
    },
}
