//! Async owner of the conversation state

use super::state::{ConversationState, Message, MessageIdGenerator};
use super::transition::{transition, TransitionError};
use super::{ChatTransport, Effect, Event, TransportError};
use crate::api::ChatRequest;
use std::sync::Arc;
use tokio::sync::watch;

/// What became of one `send_message` or `retry_last_message` call
#[derive(Debug)]
pub enum SendOutcome {
    Replied(String),
    /// Recorded in the conversation as an apology message
    Failed(TransportError),
    /// Nothing was sent
    Ignored(TransitionError),
}

/// Holds the conversation, feeds events through [`transition`] and runs the
/// resulting effects.
///
/// Every change is published to [`ConversationStore::subscribe`] receivers.
pub struct ConversationStore {
    transport: Arc<dyn ChatTransport>,
    ids: MessageIdGenerator,
    state: watch::Sender<ConversationState>,
}

impl ConversationStore {
    pub fn new(transport: Arc<dyn ChatTransport>) -> Self {
        let ids = MessageIdGenerator::new();
        let (state, _) = watch::channel(ConversationState::new(ids.greeting()));
        Self {
            transport,
            ids,
            state,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ConversationState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> ConversationState {
        self.state.borrow().clone()
    }

    pub fn messages(&self) -> Vec<Message> {
        self.state.borrow().messages.clone()
    }

    pub fn is_in_flight(&self) -> bool {
        self.state.borrow().in_flight
    }

    pub fn last_error(&self) -> Option<String> {
        self.state.borrow().last_error.clone()
    }

    pub fn has_conversation(&self) -> bool {
        self.state.borrow().has_conversation()
    }

    pub fn last_user_message(&self) -> Option<Message> {
        self.state.borrow().last_user_message().cloned()
    }

    /// Send `text` (trimmed) and wait for the exchange to settle.
    ///
    /// Empty input, or a send while another is in flight, is ignored.
    pub async fn send_message(&self, text: &str) -> SendOutcome {
        let message = self.ids.user(text.trim());
        self.start(Event::UserSubmitted { message }).await
    }

    /// Drop a trailing apology and resend the last user message
    pub async fn retry_last_message(&self) -> SendOutcome {
        let message = self.ids.user(String::new());
        self.start(Event::RetryRequested { message }).await
    }

    /// Back to the greeting alone. A reply still in flight is discarded.
    pub fn clear_conversation(&self) {
        let greeting = self.ids.greeting();
        self.settle(Event::Clear { greeting });
    }

    async fn start(&self, event: Event) -> SendOutcome {
        match self.apply(event) {
            Ok(effects) => {
                let mut outcome = SendOutcome::Ignored(TransitionError::InvalidTransition(
                    "no exchange requested".to_string(),
                ));
                for effect in effects {
                    outcome = self.execute(effect).await;
                }
                outcome
            }
            Err(reason) => {
                tracing::debug!(%reason, "Send ignored");
                SendOutcome::Ignored(reason)
            }
        }
    }

    async fn execute(&self, effect: Effect) -> SendOutcome {
        match effect {
            Effect::RequestReply {
                epoch,
                message,
                history,
            } => {
                let request = ChatRequest { message, history };
                match self.transport.exchange(&request).await {
                    Ok(reply) => {
                        self.settle(Event::ReplyReceived {
                            epoch,
                            message: self.ids.assistant(reply.clone()),
                        });
                        SendOutcome::Replied(reply)
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Chat exchange failed");
                        self.settle(Event::ExchangeFailed {
                            epoch,
                            error: e.to_string(),
                            notice: self.ids.failure_notice(),
                        });
                        SendOutcome::Failed(e)
                    }
                }
            }
        }
    }

    /// Apply an event whose effects, if any, need no execution
    fn settle(&self, event: Event) {
        if let Err(e) = self.apply(event) {
            tracing::error!(error = %e, "Conversation event rejected");
        }
    }

    fn apply(&self, event: Event) -> Result<Vec<Effect>, TransitionError> {
        let mut outcome = Ok(Vec::new());
        self.state.send_if_modified(|state| match transition(state, event) {
            Ok(result) => {
                *state = result.new_state;
                outcome = Ok(result.effects);
                true
            }
            Err(e) => {
                outcome = Err(e);
                false
            }
        });
        outcome
    }
}
