//! Provider trait — the abstraction over language-model backends.
//!
//! A Provider knows how to submit a conversation plus a tool catalog and
//! get back either a final text turn or a turn carrying structured
//! tool-invocation requests. The orchestration loop calls `generate()`
//! without knowing which backend is configured — every implementation
//! emits the same structured protocol.

use crate::error::ProviderError;
use crate::turn::Turn;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One model round-trip request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelRequest {
    /// The model to use (e.g., "gemini-2.0-flash-lite").
    pub model: String,

    /// The ordered conversation turns.
    pub turns: Vec<Turn>,

    /// Tools the model may request, advertised in the same call.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolDefinition>,

    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_temperature() -> f32 {
    0.2
}

/// A tool definition sent to the model so it knows what it can call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,

    /// JSON Schema describing the tool's parameters.
    pub parameters: serde_json::Value,
}

/// A complete response from a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelResponse {
    /// The model's turn: final text, or one-or-more tool invocations.
    pub turn: Turn,

    /// Which model actually responded (may differ from requested).
    pub model: String,

    /// Token usage, when the provider reports it.
    pub usage: Option<Usage>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// The core Provider trait.
///
/// Implementations: Gemini `generateContent`, OpenAI-compatible chat
/// completions (Ollama and friends).
#[async_trait]
pub trait Provider: Send + Sync {
    /// A human-readable name for this provider (e.g., "gemini", "ollama").
    fn name(&self) -> &str;

    /// Submit one round-trip and get the model's next turn.
    async fn generate(
        &self,
        request: ModelRequest,
    ) -> std::result::Result<ModelResponse, ProviderError>;

    /// Health check — can we reach the provider?
    async fn health_check(&self) -> std::result::Result<bool, ProviderError> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_definition_serialization() {
        let tool = ToolDefinition {
            name: "get_booking_status".into(),
            description: "Look up the status of a booking".into(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "booking_id": { "type": "string", "description": "The booking id" }
                },
                "required": ["booking_id"]
            }),
        };
        let json = serde_json::to_string(&tool).unwrap();
        assert!(json.contains("get_booking_status"));
        assert!(json.contains("booking_id"));
    }

    #[test]
    fn request_defaults_temperature() {
        let raw = r#"{"model": "gemini-2.0-flash-lite", "turns": []}"#;
        let req: ModelRequest = serde_json::from_str(raw).unwrap();
        assert!((req.temperature - 0.2).abs() < f32::EPSILON);
        assert!(req.tools.is_empty());
    }
}
