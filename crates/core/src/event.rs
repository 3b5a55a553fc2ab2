//! Domain event system — decoupled observability for the generate loop.
//!
//! Events are published when something interesting happens in a request.
//! Subscribers (the serve command attaches a logging one) can react
//! without coupling to the loop itself.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

/// All domain events in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DomainEvent {
    /// The loop produced a final reply for a user.
    ReplyGenerated {
        user_id: String,
        model: String,
        rounds: u32,
        tokens_used: u32,
        timestamp: DateTime<Utc>,
    },

    /// A tool invocation was dispatched.
    ToolDispatched {
        tool_name: String,
        success: bool,
        duration_ms: u64,
        timestamp: DateTime<Utc>,
    },

    /// The loop hit its round bound without a final reply.
    ReasoningLimitReached {
        user_id: String,
        rounds: u32,
        timestamp: DateTime<Utc>,
    },
}

/// A broadcast-based event bus for domain events.
///
/// Uses `tokio::sync::broadcast` for multi-consumer pub/sub.
pub struct EventBus {
    sender: broadcast::Sender<Arc<DomainEvent>>,
}

impl EventBus {
    /// Create a new event bus with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all subscribers.
    pub fn publish(&self, event: DomainEvent) {
        // Ignore send errors (no subscribers = that's fine)
        let _ = self.sender.send(Arc::new(event));
    }

    /// Subscribe to receive events.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<DomainEvent>> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn event_bus_publish_subscribe() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        bus.publish(DomainEvent::ToolDispatched {
            tool_name: "get_booking_status".into(),
            success: true,
            duration_ms: 42,
            timestamp: Utc::now(),
        });

        let event = rx.recv().await.unwrap();
        match event.as_ref() {
            DomainEvent::ToolDispatched {
                tool_name, success, ..
            } => {
                assert_eq!(tool_name, "get_booking_status");
                assert!(success);
            }
            _ => panic!("Expected ToolDispatched event"),
        }
    }

    #[test]
    fn event_bus_no_subscribers_doesnt_panic() {
        let bus = EventBus::new(16);
        bus.publish(DomainEvent::ReasoningLimitReached {
            user_id: "U456".into(),
            rounds: 1,
            timestamp: Utc::now(),
        });
    }
}
