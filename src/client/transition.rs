//! Pure state transition function
//!
//! Given the same state and event this always produces the same result; the
//! store performs the I/O the returned effects ask for.

use super::state::{ConversationState, Message};
use super::{Effect, Event};
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: ConversationState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: ConversationState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Reasons an event is refused. None of these reach the user as errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("An exchange is already in flight")]
    Busy,
    #[error("Message is empty")]
    EmptyMessage,
    #[error("No previous user message to retry")]
    NothingToRetry,
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

pub fn transition(
    state: &ConversationState,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match event {
        // ============================================================
        // Sending
        // ============================================================
        Event::UserSubmitted { .. } | Event::RetryRequested { .. } if state.in_flight => {
            Err(TransitionError::Busy)
        }

        Event::UserSubmitted { message } => {
            let text = message.text.trim();
            if text.is_empty() {
                return Err(TransitionError::EmptyMessage);
            }
            let text = text.to_string();
            Ok(begin_exchange(state.clone(), Message { text, ..message }))
        }

        Event::RetryRequested { message } => {
            let last_text = state
                .last_user_message()
                .map(|m| m.text.clone())
                .ok_or(TransitionError::NothingToRetry)?;

            let mut next = state.clone();
            if next.ends_with_failure_notice() {
                next.messages.pop();
            }
            Ok(begin_exchange(
                next,
                Message {
                    text: last_text,
                    ..message
                },
            ))
        }

        // ============================================================
        // Settlement
        // ============================================================
        Event::ReplyReceived { .. } | Event::ExchangeFailed { .. } if !state.in_flight => Err(
            TransitionError::InvalidTransition("settlement with nothing in flight".to_string()),
        ),

        // Sent before the last clear: release the flag, keep the new conversation
        Event::ReplyReceived { epoch, .. } | Event::ExchangeFailed { epoch, .. }
            if epoch != state.epoch =>
        {
            Ok(TransitionResult::new(ConversationState {
                in_flight: false,
                ..state.clone()
            }))
        }

        Event::ReplyReceived { message, .. } => {
            let mut next = state.clone();
            next.messages.push(message);
            next.in_flight = false;
            Ok(TransitionResult::new(next))
        }

        Event::ExchangeFailed { error, notice, .. } => {
            let mut next = state.clone();
            next.messages.push(notice);
            next.last_error = Some(error);
            next.in_flight = false;
            Ok(TransitionResult::new(next))
        }

        // ============================================================
        // Clearing
        // ============================================================
        Event::Clear { greeting } => Ok(TransitionResult::new(ConversationState {
            messages: vec![greeting],
            in_flight: state.in_flight,
            last_error: None,
            epoch: state.epoch + 1,
        })),
    }
}

/// Append the user message and ask for a reply
fn begin_exchange(mut state: ConversationState, message: Message) -> TransitionResult {
    let history = state.history();
    let effect = Effect::RequestReply {
        epoch: state.epoch,
        message: message.text.clone(),
        history,
    };
    state.messages.push(message);
    state.in_flight = true;
    state.last_error = None;
    TransitionResult::new(state).with_effect(effect)
}
