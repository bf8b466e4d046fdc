//! Effects produced by transitions

use crate::api::HistoryEntry;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Send one exchange to the gateway
    RequestReply {
        epoch: u64,
        message: String,
        /// Context as it stood before `message` was appended
        history: Vec<HistoryEntry>,
    },
}
