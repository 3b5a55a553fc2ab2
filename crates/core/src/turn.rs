//! Turn and tool-call value objects.
//!
//! A `Turn` is one entry in the ordered conversation sequence submitted to
//! and returned by the model during a single generate request. The sequence
//! is rebuilt from scratch on every request and never persisted — the chat
//! history store owns durable messages, not this crate.

use serde::{Deserialize, Serialize};
use serde_json::json;

/// The role of a turn in the conversation sequence.
///
/// `System` is a protocol-neutral marker; each provider maps it onto its
/// own wire convention (Gemini has no system role and gets a leading user
/// turn instead). `Tool` turns carry the combined results of one dispatch
/// round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Model,
    Tool,
}

/// A structured tool-invocation request emitted by the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInvocation {
    /// Call ID — provider-assigned where the protocol has one, otherwise
    /// synthesized by the provider adapter.
    pub id: String,

    /// Name of the tool to execute.
    pub name: String,

    /// Arguments as a JSON object.
    pub arguments: serde_json::Value,
}

/// The explicit outcome of dispatching one tool invocation.
///
/// Dispatch is total: backend failures and unknown tool names become
/// `ToolPayload::Error`, never a raised error. Every outcome is paired 1:1
/// with the invocation it answers, in the same round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolOutcome {
    /// The invocation ID this outcome answers.
    pub call_id: String,

    /// The tool name, echoed back for the model.
    pub name: String,

    /// Success payload or captured failure.
    pub payload: ToolPayload,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolPayload {
    Success(serde_json::Value),
    Error(String),
}

impl ToolOutcome {
    pub fn success(
        call_id: impl Into<String>,
        name: impl Into<String>,
        value: serde_json::Value,
    ) -> Self {
        Self {
            call_id: call_id.into(),
            name: name.into(),
            payload: ToolPayload::Success(value),
        }
    }

    pub fn error(
        call_id: impl Into<String>,
        name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            call_id: call_id.into(),
            name: name.into(),
            payload: ToolPayload::Error(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.payload, ToolPayload::Success(_))
    }

    /// The JSON value handed back to the model as the function response.
    pub fn response_value(&self) -> serde_json::Value {
        match &self.payload {
            ToolPayload::Success(value) => json!({ "result": value }),
            ToolPayload::Error(message) => json!({ "error": message }),
        }
    }
}

/// A single turn in the conversation sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    /// Who produced this turn.
    pub role: Role,

    /// The text content (may be empty on pure tool-call turns).
    pub content: String,

    /// Tool invocations requested by the model (model turns only).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolInvocation>,

    /// Combined tool outcomes of one dispatch round (tool turns only).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_results: Vec<ToolOutcome>,
}

impl Turn {
    /// Create a system turn carrying static instructions.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_results: Vec::new(),
        }
    }

    /// Create a user turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_results: Vec::new(),
        }
    }

    /// Create a plain-text model turn.
    pub fn model(content: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_results: Vec::new(),
        }
    }

    /// Create a model turn that may carry tool invocations.
    pub fn model_reply(content: impl Into<String>, tool_calls: Vec<ToolInvocation>) -> Self {
        Self {
            role: Role::Model,
            content: content.into(),
            tool_calls,
            tool_results: Vec::new(),
        }
    }

    /// Create the single combined turn carrying all outcomes of one
    /// dispatch round.
    pub fn tool_results(outcomes: Vec<ToolOutcome>) -> Self {
        Self {
            role: Role::Tool,
            content: String::new(),
            tool_calls: Vec::new(),
            tool_results: outcomes,
        }
    }
}
