//! The portcall tool catalog — the read-only backend lookups the model may
//! request during a conversation.
//!
//! Exactly three tools exist, all idempotent and side-effect free on the
//! backend: booking status, a user's bookings, and the terminal schedule.
//! `catalog()` wires them to a shared backend client; `ToolDispatcher`
//! executes invocations and is total (it never raises to the loop).

pub mod booking_status;
pub mod dispatcher;
pub mod port_schedule;
pub mod user_bookings;

#[cfg(test)]
pub(crate) mod test_support;

pub use dispatcher::ToolDispatcher;

use portcall_core::backend::PortBackend;
use portcall_core::tool::ToolCatalog;
use std::sync::Arc;

/// Build the full catalog against one backend client.
///
/// `default_user_id` is the identity used when the model omits a user_id
/// argument — a single-tenant MVP assumption, not an access control.
pub fn catalog(backend: Arc<dyn PortBackend>, default_user_id: impl Into<String>) -> ToolCatalog {
    let default_user_id = default_user_id.into();
    let mut catalog = ToolCatalog::new();
    catalog.register(Box::new(booking_status::BookingStatusTool::new(
        backend.clone(),
        default_user_id.clone(),
    )));
    catalog.register(Box::new(user_bookings::UserBookingsTool::new(
        backend.clone(),
        default_user_id,
    )));
    catalog.register(Box::new(port_schedule::PortScheduleTool::new(backend)));
    catalog
}
