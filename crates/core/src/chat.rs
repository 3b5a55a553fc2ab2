//! Persisted chat message types.
//!
//! Messages are owned by the external history store; the core only reads
//! the most recent window when assembling a conversation.

use serde::{Deserialize, Serialize};

/// Who wrote a persisted chat message.
///
/// The store is only contractually required to send `human` for end users;
/// any other value (the assistant, future system senders) maps to the model
/// side of the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    Human,
    #[serde(other)]
    Agent,
}

/// One message as persisted by the chat history store. Immutable here —
/// the field names match the store's JSON exactly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub message_id: String,
    pub sender: Sender,
    pub message: String,
    pub index: i64,
    pub created_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_store_payload() {
        let raw = r#"{
            "message_id": "m1",
            "sender": "human",
            "message": "Hi there",
            "index": 0,
            "created_at": "2024-02-07T10:00:00Z"
        }"#;
        let msg: ChatMessage = serde_json::from_str(raw).unwrap();
        assert_eq!(msg.sender, Sender::Human);
        assert_eq!(msg.message, "Hi there");
    }

    #[test]
    fn unknown_sender_maps_to_agent() {
        let raw = r#"{
            "message_id": "m2",
            "sender": "system",
            "message": "migrated",
            "index": 1,
            "created_at": "2024-02-07T10:00:01Z"
        }"#;
        let msg: ChatMessage = serde_json::from_str(raw).unwrap();
        assert_eq!(msg.sender, Sender::Agent);
    }
}
