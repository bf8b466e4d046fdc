//! Property-based tests for the conversation transition function

use super::state::{ConversationState, MessageIdGenerator, MessageKind, Role};
use super::transition::{transition, TransitionError};
use super::{Effect, Event};
use proptest::prelude::*;

// ============================================================================
// Generators
// ============================================================================

/// Abstract user/network actions, turned into events against a live state
#[derive(Debug, Clone)]
enum Action {
    Submit(String),
    Retry,
    Reply(String),
    Fail(String),
    StaleReply,
    Clear,
}

fn arb_text() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z0-9 ?!]{1,40}",
        Just(String::new()),
        "[ \t\n]{1,5}",
    ]
}

fn arb_action() -> impl Strategy<Value = Action> {
    prop_oneof![
        3 => arb_text().prop_map(Action::Submit),
        1 => Just(Action::Retry),
        2 => "[a-z ]{1,20}".prop_map(Action::Reply),
        1 => "[a-z ]{1,20}".prop_map(Action::Fail),
        1 => Just(Action::StaleReply),
        1 => Just(Action::Clear),
    ]
}

fn to_event(ids: &MessageIdGenerator, state: &ConversationState, action: Action) -> Event {
    match action {
        Action::Submit(text) => Event::UserSubmitted {
            message: ids.user(text),
        },
        Action::Retry => Event::RetryRequested {
            message: ids.user(""),
        },
        Action::Reply(text) => Event::ReplyReceived {
            epoch: state.epoch,
            message: ids.assistant(text),
        },
        Action::Fail(error) => Event::ExchangeFailed {
            epoch: state.epoch,
            error,
            notice: ids.failure_notice(),
        },
        Action::StaleReply => Event::ReplyReceived {
            epoch: state.epoch.wrapping_sub(1),
            message: ids.assistant("late"),
        },
        Action::Clear => Event::Clear {
            greeting: ids.greeting(),
        },
    }
}

fn check_invariants(state: &ConversationState) {
    assert!(!state.messages.is_empty());
    assert_eq!(state.messages[0].kind, MessageKind::Greeting);
    assert_eq!(
        state.messages.iter().filter(|m| m.kind == MessageKind::Greeting).count(),
        1
    );
    assert!(state
        .messages
        .iter()
        .filter(|m| m.role == Role::User)
        .all(|m| !m.text.trim().is_empty()));
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn invariants_hold_over_any_sequence(actions in prop::collection::vec(arb_action(), 0..40)) {
        let ids = MessageIdGenerator::new();
        let mut state = ConversationState::new(ids.greeting());

        for action in actions {
            let event = to_event(&ids, &state, action);
            if let Ok(result) = transition(&state, event) {
                state = result.new_state;
            }
            check_invariants(&state);
        }
    }

    #[test]
    fn no_second_send_while_in_flight(first in "[a-z]{1,10}", second in arb_text()) {
        let ids = MessageIdGenerator::new();
        let state = ConversationState::new(ids.greeting());
        let sending = transition(&state, Event::UserSubmitted { message: ids.user(first) })
            .unwrap()
            .new_state;

        for event in [
            Event::UserSubmitted { message: ids.user(second) },
            Event::RetryRequested { message: ids.user("") },
        ] {
            prop_assert_eq!(transition(&sending, event).unwrap_err(), TransitionError::Busy);
        }
    }

    #[test]
    fn every_send_emits_exactly_one_request(actions in prop::collection::vec(arb_action(), 0..30)) {
        let ids = MessageIdGenerator::new();
        let mut state = ConversationState::new(ids.greeting());

        for action in actions {
            let event = to_event(&ids, &state, action);
            let was_in_flight = state.in_flight;
            if let Ok(result) = transition(&state, event) {
                let started = !was_in_flight && result.new_state.in_flight;
                prop_assert_eq!(result.effects.len(), usize::from(started));
                for Effect::RequestReply { epoch, .. } in &result.effects {
                    prop_assert_eq!(*epoch, result.new_state.epoch);
                }
                state = result.new_state;
            }
        }
    }

    #[test]
    fn clear_always_leaves_one_message(actions in prop::collection::vec(arb_action(), 0..30)) {
        let ids = MessageIdGenerator::new();
        let mut state = ConversationState::new(ids.greeting());
        for action in actions {
            let event = to_event(&ids, &state, action);
            if let Ok(result) = transition(&state, event) {
                state = result.new_state;
            }
        }

        let epoch = state.epoch;
        let cleared = transition(&state, Event::Clear { greeting: ids.greeting() })
            .unwrap()
            .new_state;
        prop_assert_eq!(cleared.messages.len(), 1);
        prop_assert!(cleared.last_error.is_none());
        prop_assert_eq!(cleared.epoch, epoch + 1);
    }

    #[test]
    fn round_trip_appends_user_then_assistant(
        text in "[ \t\n]{0,3}[a-zA-Z0-9]{1,30}[ \t\n]{0,3}",
        reply in "[a-z ]{1,30}",
    ) {
        let ids = MessageIdGenerator::new();
        let state = ConversationState::new(ids.greeting());
        let sending = transition(&state, Event::UserSubmitted { message: ids.user(text.clone()) })
            .unwrap()
            .new_state;
        let done = transition(
            &sending,
            Event::ReplyReceived { epoch: sending.epoch, message: ids.assistant(reply.clone()) },
        )
        .unwrap()
        .new_state;

        prop_assert_eq!(done.messages.len(), 3);
        prop_assert_eq!(done.messages[1].role, Role::User);
        prop_assert_eq!(done.messages[1].text.as_str(), text.trim());
        prop_assert_eq!(done.messages[2].role, Role::Assistant);
        prop_assert_eq!(&done.messages[2].text, &reply);
        prop_assert!(!done.in_flight);
    }
}
