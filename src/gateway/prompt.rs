//! Prompt assembly

use crate::llm::PromptTurn;

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are Cogfusion.ai, a helpful AI assistant. \
You provide clear, concise, and accurate responses. \
When someone greets you, introduce yourself and offer to help.";

/// System instruction, then prior turns oldest first, then the new message
pub fn assemble_prompt(system: &str, history: &[PromptTurn], message: &str) -> Vec<PromptTurn> {
    let mut turns = Vec::with_capacity(history.len() + 2);
    turns.push(PromptTurn::system(system));
    turns.extend_from_slice(history);
    turns.push(PromptTurn::user(message));
    turns
}
