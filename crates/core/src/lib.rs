//! # portcall core
//!
//! Domain types, traits, and error definitions for the portcall booking
//! assistant. This crate has **zero framework dependencies** — it defines
//! the domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every external collaborator is defined as a trait here: the language
//! model (`Provider`), the booking backend (`PortBackend`), the chat
//! history store (`HistoryStore`), and the callable tools (`Tool`).
//! Implementations live in their respective crates. This enables:
//! - Swapping model backends via configuration
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod backend;
pub mod booking;
pub mod chat;
pub mod error;
pub mod event;
pub mod provider;
pub mod tool;
pub mod turn;

// Re-export key types at crate root for ergonomics
pub use backend::{HistoryStore, PortBackend};
pub use booking::{Booking, BookingStatus, PortSchedule, ScheduleSlot, Timeslot};
pub use chat::{ChatMessage, Sender};
pub use error::{BackendError, Error, ProviderError, Result, ToolError};
pub use event::{DomainEvent, EventBus};
pub use provider::{ModelRequest, ModelResponse, Provider, ToolDefinition, Usage};
pub use tool::{Tool, ToolCatalog};
pub use turn::{Role, ToolInvocation, ToolOutcome, ToolPayload, Turn};
