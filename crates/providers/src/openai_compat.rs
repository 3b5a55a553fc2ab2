//! OpenAI-compatible provider implementation.
//!
//! Works with Ollama, OpenAI, vLLM, and any endpoint exposing the
//! `/v1/chat/completions` protocol with tool calling. It emits the same
//! structured tool-invocation turns as the Gemini provider, so the
//! orchestration loop never knows which backend is configured.

use async_trait::async_trait;
use portcall_core::error::ProviderError;
use portcall_core::provider::{ModelRequest, ModelResponse, Provider, ToolDefinition, Usage};
use portcall_core::turn::{Role, ToolInvocation, Turn};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// An OpenAI-compatible chat-completions provider.
pub struct OpenAiCompatProvider {
    name: String,
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiCompatProvider {
    /// Create a new OpenAI-compatible provider.
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        }
    }

    /// Create an Ollama provider (convenience constructor).
    pub fn ollama(base_url: Option<&str>) -> Self {
        let base = base_url.unwrap_or("http://localhost:11434");
        Self::new(
            "ollama",
            format!("{}/v1", base.trim_end_matches('/')),
            "ollama", // Ollama doesn't need a real key
        )
    }

    /// Convert our turns to OpenAI API messages.
    ///
    /// The combined tool turn fans out into one `tool` message per outcome
    /// — that is this protocol's convention; the domain turn stays one.
    fn to_api_messages(turns: &[Turn]) -> Vec<ApiMessage> {
        let mut messages = Vec::with_capacity(turns.len());

        for turn in turns {
            if turn.role == Role::Tool {
                for outcome in &turn.tool_results {
                    messages.push(ApiMessage {
                        role: "tool".into(),
                        content: Some(outcome.response_value().to_string()),
                        tool_calls: None,
                        tool_call_id: Some(outcome.call_id.clone()),
                    });
                }
                continue;
            }

            let role = match turn.role {
                Role::System => "system",
                Role::User => "user",
                Role::Model => "assistant",
                Role::Tool => unreachable!(),
            };

            let tool_calls = if turn.tool_calls.is_empty() {
                None
            } else {
                Some(
                    turn.tool_calls
                        .iter()
                        .map(|tc| ApiToolCall {
                            id: tc.id.clone(),
                            r#type: "function".into(),
                            function: ApiFunction {
                                name: tc.name.clone(),
                                arguments: tc.arguments.to_string(),
                            },
                        })
                        .collect(),
                )
            };

            messages.push(ApiMessage {
                role: role.into(),
                content: Some(turn.content.clone()),
                tool_calls,
                tool_call_id: None,
            });
        }

        messages
    }

    /// Convert tool definitions to OpenAI API format.
    fn to_api_tools(tools: &[ToolDefinition]) -> Vec<ApiToolDefinition> {
        tools
            .iter()
            .map(|t| ApiToolDefinition {
                r#type: "function".into(),
                function: ApiToolFunction {
                    name: t.name.clone(),
                    description: t.description.clone(),
                    parameters: t.parameters.clone(),
                },
            })
            .collect()
    }
}

#[async_trait]
impl Provider for OpenAiCompatProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(&self, request: ModelRequest) -> Result<ModelResponse, ProviderError> {
        let url = format!("{}/chat/completions", self.base_url);

        let mut body = serde_json::json!({
            "model": request.model,
            "messages": Self::to_api_messages(&request.turns),
            "temperature": request.temperature,
            "stream": false,
        });

        if !request.tools.is_empty() {
            body["tools"] = serde_json::json!(Self::to_api_tools(&request.tools));
        }

        debug!(provider = %self.name, model = %request.model, "Sending completion request");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(e.to_string())
                } else {
                    ProviderError::Network(e.to_string())
                }
            })?;

        let status = response.status().as_u16();

        if status == 429 {
            return Err(ProviderError::RateLimited {
                retry_after_secs: 5,
            });
        }

        if status == 401 || status == 403 {
            return Err(ProviderError::AuthenticationFailed(
                "Invalid API key or insufficient permissions".into(),
            ));
        }

        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Provider returned error");
            return Err(ProviderError::Api {
                status_code: status,
                message: error_body,
            });
        }

        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;

        let choice = api_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::MalformedResponse("no choices in response".into()))?;

        let mut tool_calls = Vec::new();
        for tc in choice.message.tool_calls.unwrap_or_default() {
            let arguments = serde_json::from_str(&tc.function.arguments).map_err(|e| {
                ProviderError::MalformedResponse(format!(
                    "unparseable arguments for {}: {e}",
                    tc.function.name
                ))
            })?;
            tool_calls.push(ToolInvocation {
                id: tc.id,
                name: tc.function.name,
                arguments,
            });
        }

        let usage = api_response.usage.map(|u| Usage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });

        Ok(ModelResponse {
            turn: Turn::model_reply(choice.message.content.unwrap_or_default(), tool_calls),
            model: api_response.model,
            usage,
        })
    }

    async fn health_check(&self) -> Result<bool, ProviderError> {
        let url = format!("{}/models", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        Ok(response.status().is_success())
    }
}

// --- OpenAI API types (internal) ---

#[derive(Debug, Serialize, Deserialize)]
struct ApiMessage {
    role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<ApiToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiToolCall {
    id: String,
    r#type: String,
    function: ApiFunction,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiFunction {
    name: String,
    arguments: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiToolDefinition {
    r#type: String,
    function: ApiToolFunction,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiToolFunction {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    model: String,
    choices: Vec<ApiChoice>,
    usage: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiMessage,
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use portcall_core::turn::ToolOutcome;

    #[test]
    fn ollama_constructor() {
        let provider = OpenAiCompatProvider::ollama(None);
        assert_eq!(provider.name(), "ollama");
        assert!(provider.base_url.contains("localhost:11434"));
        assert!(provider.base_url.ends_with("/v1"));
    }

    #[test]
    fn message_conversion_roles() {
        let turns = vec![
            Turn::system("You are a port booking assistant"),
            Turn::user("Hello"),
            Turn::model("Hi! How can I help?"),
        ];
        let messages = OpenAiCompatProvider::to_api_messages(&turns);
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[1].role, "user");
        assert_eq!(messages[2].role, "assistant");
    }

    #[test]
    fn combined_tool_turn_fans_out() {
        let turn = Turn::tool_results(vec![
            ToolOutcome::success("call_a", "get_booking_status", serde_json::json!({"status": "confirmed"})),
            ToolOutcome::error("call_b", "get_port_schedule", "not found: T9"),
        ]);
        let messages = OpenAiCompatProvider::to_api_messages(&[turn]);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "tool");
        assert_eq!(messages[0].tool_call_id.as_deref(), Some("call_a"));
        assert!(messages[0].content.as_ref().unwrap().contains("confirmed"));
        assert_eq!(messages[1].tool_call_id.as_deref(), Some("call_b"));
        assert!(messages[1].content.as_ref().unwrap().contains("not found"));
    }

    #[test]
    fn assistant_tool_calls_serialize_arguments_as_string() {
        let turn = Turn::model_reply(
            "",
            vec![ToolInvocation {
                id: "call_1".into(),
                name: "get_user_bookings".into(),
                arguments: serde_json::json!({"date": "2024-02-07", "hour": "14"}),
            }],
        );
        let messages = OpenAiCompatProvider::to_api_messages(&[turn]);
        let tc = &messages[0].tool_calls.as_ref().unwrap()[0];
        assert_eq!(tc.function.name, "get_user_bookings");
        assert!(tc.function.arguments.contains("2024-02-07"));
    }

    #[test]
    fn tool_definition_conversion() {
        let tools = vec![ToolDefinition {
            name: "get_booking_status".into(),
            description: "Look up a booking".into(),
            parameters: serde_json::json!({"type": "object"}),
        }];
        let api_tools = OpenAiCompatProvider::to_api_tools(&tools);
        assert_eq!(api_tools.len(), 1);
        assert_eq!(api_tools[0].function.name, "get_booking_status");
        assert_eq!(api_tools[0].r#type, "function");
    }

    #[test]
    fn parses_response_with_tool_call() {
        let raw = r#"{
            "model": "llama3.2",
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_9",
                        "type": "function",
                        "function": {"name": "get_booking_status", "arguments": "{\"booking_id\": \"BK123\"}"}
                    }]
                }
            }],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
        }"#;
        let parsed: ApiResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.choices.len(), 1);
        let tc = &parsed.choices[0].message.tool_calls.as_ref().unwrap()[0];
        assert_eq!(tc.id, "call_9");
        assert_eq!(tc.function.name, "get_booking_status");
        assert_eq!(parsed.usage.as_ref().unwrap().total_tokens, 15);
    }
}
