//! Conversation assembly and the tool-calling orchestration loop.
//!
//! This crate is the core of portcall: `conversation` turns persisted chat
//! history plus the new message into the turn sequence the model consumes,
//! and `orchestrator` drives model round-trips and tool dispatch until a
//! final text reply (or the round bound) is reached.

pub mod conversation;
pub mod orchestrator;

pub use conversation::{HISTORY_WINDOW, READY_ACK, build_turns};
pub use orchestrator::{Orchestrator, REASONING_LIMIT_REPLY};
