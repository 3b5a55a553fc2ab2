//! Trait seams for the external collaborators reached over HTTP:
//! the booking backend and the chat history store.
//!
//! The HTTP implementations live in `portcall-backend`; tests substitute
//! in-memory mocks.

use crate::booking::{Booking, PortSchedule};
use crate::chat::ChatMessage;
use crate::error::BackendError;
use async_trait::async_trait;

/// Read-only lookups against the booking/schedule backend. Every call is
/// idempotent and side-effect free.
#[async_trait]
pub trait PortBackend: Send + Sync {
    /// Look up one booking. Fails with `NotFound` for an unknown id and
    /// `Forbidden` when the booking belongs to a different user.
    async fn booking_status(
        &self,
        booking_id: &str,
        user_id: &str,
    ) -> std::result::Result<Booking, BackendError>;

    /// All of a user's bookings for a date and hour. No matches is an
    /// empty list, not an error.
    async fn user_bookings(
        &self,
        user_id: &str,
        date: &str,
        hour: &str,
    ) -> std::result::Result<Vec<Booking>, BackendError>;

    /// The terminal schedule for a date. Unknown dates yield an empty
    /// schedule; `NotFound` only means the terminal itself is unknown.
    async fn port_schedule(&self, date: &str) -> std::result::Result<PortSchedule, BackendError>;
}

/// The persisted chat history, ordered oldest to newest.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn chat_messages(
        &self,
        chat_id: &str,
    ) -> std::result::Result<Vec<ChatMessage>, BackendError>;
}
