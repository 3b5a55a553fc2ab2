//! Conversation assembly — turning persisted history plus the new message
//! into the ordered turn sequence submitted to the model.

use portcall_core::chat::{ChatMessage, Sender};
use portcall_core::turn::Turn;

/// How many trailing history messages are carried into the conversation.
pub const HISTORY_WINDOW: usize = 10;

/// The canned acknowledgment paired with the instruction turn.
pub const READY_ACK: &str = "I understand. I'll help you with your port booking needs";

/// Build the turn sequence for one generate request.
///
/// When history is non-empty, the sequence opens with an instruction turn
/// (the static system prompt plus the current user's id) and the model's
/// canned acknowledgment. When history is empty neither is emitted, so a
/// brand-new chat reaches the model without instructions.
/// TODO: decide whether new chats should receive the system prompt
/// unconditionally before raising the round bound.
///
/// At most the last [`HISTORY_WINDOW`] messages are mapped, human senders
/// to the user role and everything else to the model role, preserving
/// order. The new message always comes last.
pub fn build_turns(
    system_prompt: &str,
    user_id: &str,
    history: &[ChatMessage],
    message: &str,
) -> Vec<Turn> {
    let mut turns = Vec::with_capacity(history.len().min(HISTORY_WINDOW) + 3);

    if !history.is_empty() {
        turns.push(Turn::system(format!(
            "{system_prompt}\n\nThe Current User's Id is: {user_id}"
        )));
        turns.push(Turn::model(READY_ACK));
    }

    let window_start = history.len().saturating_sub(HISTORY_WINDOW);
    for msg in &history[window_start..] {
        let turn = match msg.sender {
            Sender::Human => Turn::user(&msg.message),
            Sender::Agent => Turn::model(&msg.message),
        };
        turns.push(turn);
    }

    turns.push(Turn::user(message));
    turns
}
