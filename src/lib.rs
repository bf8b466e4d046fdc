//! Chat relay
//!
//! A client-side conversation store and the HTTP gateway it talks to. The
//! gateway validates, rate-limits and forwards each message to a language
//! model provider.

pub mod api;
pub mod client;
pub mod config;
pub mod gateway;
pub mod llm;
