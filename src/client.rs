//! Client-side conversation store
//!
//! A pure transition function over an immutable [`ConversationState`], and an
//! async [`ConversationStore`] that runs the network effects it produces.

mod effect;
mod event;
pub mod state;
mod store;
pub(crate) mod transition;
mod transport;

#[cfg(test)]
mod proptests;
#[cfg(test)]
pub(crate) mod testing;

pub use effect::Effect;
pub use event::Event;
pub use state::{ConversationState, Message, MessageKind, Role, APOLOGY, GREETING};
pub use store::{ConversationStore, SendOutcome};
pub use transition::{transition, TransitionError, TransitionResult};
pub use transport::{ChatTransport, HttpTransport, TransportError, DEFAULT_TRANSPORT_TIMEOUT};
