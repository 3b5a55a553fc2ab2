//! Gemini provider — the `generateContent` REST API with native function
//! calling.
//!
//! Gemini has no dedicated system role and no call IDs: system turns are
//! sent as leading user content, and invocation IDs are synthesized so the
//! rest of the workspace can stay protocol-neutral.

use async_trait::async_trait;
use portcall_core::error::ProviderError;
use portcall_core::provider::{ModelRequest, ModelResponse, Provider, ToolDefinition, Usage};
use portcall_core::turn::{Role, ToolInvocation, Turn};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// A Gemini (Google AI) provider.
pub struct GeminiProvider {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl GeminiProvider {
    /// Create a provider against the public Google AI endpoint.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Create a provider against a custom endpoint (proxies, tests).
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        }
    }

    /// Convert our turns to Gemini content format.
    fn to_api_contents(turns: &[Turn]) -> Vec<ApiContent> {
        turns
            .iter()
            .map(|turn| match turn.role {
                // Gemini has no system role — instructions ride as user text.
                Role::System | Role::User => ApiContent {
                    role: "user".into(),
                    parts: vec![ApiPart::text(&turn.content)],
                },
                Role::Model => {
                    let mut parts = Vec::new();
                    if !turn.content.is_empty() {
                        parts.push(ApiPart::text(&turn.content));
                    }
                    for call in &turn.tool_calls {
                        parts.push(ApiPart {
                            function_call: Some(ApiFunctionCall {
                                name: call.name.clone(),
                                args: Some(call.arguments.clone()),
                            }),
                            ..ApiPart::default()
                        });
                    }
                    ApiContent {
                        role: "model".into(),
                        parts,
                    }
                }
                // One combined content carries every outcome of the round,
                // in dispatch order.
                Role::Tool => ApiContent {
                    role: "user".into(),
                    parts: turn
                        .tool_results
                        .iter()
                        .map(|outcome| ApiPart {
                            function_response: Some(ApiFunctionResponse {
                                name: outcome.name.clone(),
                                response: outcome.response_value(),
                            }),
                            ..ApiPart::default()
                        })
                        .collect(),
                },
            })
            .collect()
    }

    /// Convert tool definitions to Gemini function declarations.
    fn to_api_tools(tools: &[ToolDefinition]) -> serde_json::Value {
        serde_json::json!([{
            "functionDeclarations": tools
                .iter()
                .map(|t| serde_json::json!({
                    "name": t.name,
                    "description": t.description,
                    "parameters": t.parameters,
                }))
                .collect::<Vec<_>>()
        }])
    }
}

#[async_trait]
impl Provider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, request: ModelRequest) -> Result<ModelResponse, ProviderError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, request.model);

        let mut body = serde_json::json!({
            "contents": Self::to_api_contents(&request.turns),
            "generationConfig": { "temperature": request.temperature },
        });

        if !request.tools.is_empty() {
            body["tools"] = Self::to_api_tools(&request.tools);
        }

        debug!(model = %request.model, turns = request.turns.len(), "Sending Gemini request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
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
            warn!(status, body = %error_body, "Gemini returned error");
            return Err(ProviderError::Api {
                status_code: status,
                message: error_body,
            });
        }

        let api_response: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;

        let model = request.model;
        parse_candidate(api_response, model)
    }

    async fn health_check(&self) -> Result<bool, ProviderError> {
        let url = format!("{}/models", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        Ok(response.status().is_success())
    }
}

/// Extract the model turn out of the first candidate.
fn parse_candidate(
    api_response: GenerateContentResponse,
    model: String,
) -> Result<ModelResponse, ProviderError> {
    let candidate = api_response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::MalformedResponse("no candidates in response".into()))?;

    let content = candidate
        .content
        .ok_or_else(|| ProviderError::MalformedResponse("candidate has no content".into()))?;

    let mut text = String::new();
    let mut tool_calls = Vec::new();

    for part in content.parts {
        if let Some(t) = part.text {
            text.push_str(&t);
        }
        if let Some(fc) = part.function_call {
            tool_calls.push(ToolInvocation {
                id: uuid::Uuid::new_v4().to_string(),
                name: fc.name,
                arguments: fc.args.unwrap_or_else(|| serde_json::json!({})),
            });
        }
    }

    let usage = api_response.usage_metadata.map(|u| Usage {
        prompt_tokens: u.prompt_token_count,
        completion_tokens: u.candidates_token_count,
        total_tokens: u.total_token_count,
    });

    Ok(ModelResponse {
        turn: Turn::model_reply(text, tool_calls),
        model,
        usage,
    })
}

// --- Gemini API types (internal) ---

#[derive(Debug, Default, Serialize, Deserialize)]
struct ApiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,

    #[serde(
        default,
        rename = "functionCall",
        skip_serializing_if = "Option::is_none"
    )]
    function_call: Option<ApiFunctionCall>,

    #[serde(
        default,
        rename = "functionResponse",
        skip_serializing_if = "Option::is_none"
    )]
    function_response: Option<ApiFunctionResponse>,
}

impl ApiPart {
    fn text(content: &str) -> Self {
        Self {
            text: Some(content.to_string()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiFunctionCall {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    args: Option<serde_json::Value>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiFunctionResponse {
    name: String,
    response: serde_json::Value,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiContent {
    role: String,
    #[serde(default)]
    parts: Vec<ApiPart>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<ApiCandidate>,

    #[serde(default, rename = "usageMetadata")]
    usage_metadata: Option<ApiUsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct ApiCandidate {
    content: Option<ApiContent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiUsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use portcall_core::turn::ToolOutcome;

    #[test]
    fn system_turn_rides_as_user_content() {
        let turns = vec![Turn::system("You are a port booking assistant"), Turn::user("Hi")];
        let contents = GeminiProvider::to_api_contents(&turns);
        assert_eq!(contents.len(), 2);
        assert_eq!(contents[0].role, "user");
        assert_eq!(
            contents[0].parts[0].text.as_deref(),
            Some("You are a port booking assistant")
        );
    }

    #[test]
    fn model_turn_with_calls_becomes_function_call_parts() {
        let turn = Turn::model_reply(
            "",
            vec![ToolInvocation {
                id: "synth".into(),
                name: "get_booking_status".into(),
                arguments: serde_json::json!({"booking_id": "BK123"}),
            }],
        );
        let contents = GeminiProvider::to_api_contents(&[turn]);
        assert_eq!(contents[0].role, "model");
        let fc = contents[0].parts[0].function_call.as_ref().unwrap();
        assert_eq!(fc.name, "get_booking_status");
        assert_eq!(fc.args.as_ref().unwrap()["booking_id"], "BK123");
    }

    #[test]
    fn tool_turn_combines_outcomes_into_one_content() {
        let turn = Turn::tool_results(vec![
            ToolOutcome::success("a", "get_booking_status", serde_json::json!({"status": "confirmed"})),
            ToolOutcome::error("b", "get_port_schedule", "network error"),
        ]);
        let contents = GeminiProvider::to_api_contents(&[turn]);
        assert_eq!(contents.len(), 1);
        assert_eq!(contents[0].role, "user");
        assert_eq!(contents[0].parts.len(), 2);

        let first = contents[0].parts[0].function_response.as_ref().unwrap();
        assert_eq!(first.response["result"]["status"], "confirmed");
        let second = contents[0].parts[1].function_response.as_ref().unwrap();
        assert_eq!(second.response["error"], "network error");
    }

    #[test]
    fn parses_text_candidate() {
        let raw = r#"{
            "candidates": [
                {"content": {"role": "model", "parts": [{"text": "Booking BK123 is confirmed."}]}}
            ],
            "usageMetadata": {"promptTokenCount": 120, "candidatesTokenCount": 12, "totalTokenCount": 132}
        }"#;
        let api: GenerateContentResponse = serde_json::from_str(raw).unwrap();
        let response = parse_candidate(api, "gemini-2.0-flash-lite".into()).unwrap();
        assert_eq!(response.turn.content, "Booking BK123 is confirmed.");
        assert!(response.turn.tool_calls.is_empty());
        assert_eq!(response.usage.unwrap().total_tokens, 132);
    }

    #[test]
    fn parses_function_call_candidate() {
        let raw = r#"{
            "candidates": [
                {"content": {"role": "model", "parts": [
                    {"functionCall": {"name": "get_booking_status", "args": {"booking_id": "BK123"}}}
                ]}}
            ]
        }"#;
        let api: GenerateContentResponse = serde_json::from_str(raw).unwrap();
        let response = parse_candidate(api, "gemini-2.0-flash-lite".into()).unwrap();
        assert_eq!(response.turn.tool_calls.len(), 1);
        assert_eq!(response.turn.tool_calls[0].name, "get_booking_status");
        assert!(!response.turn.tool_calls[0].id.is_empty());
    }

    #[test]
    fn empty_candidates_is_malformed() {
        let api: GenerateContentResponse = serde_json::from_str(r#"{"candidates": []}"#).unwrap();
        let err = parse_candidate(api, "gemini-2.0-flash-lite".into()).unwrap_err();
        assert!(matches!(err, ProviderError::MalformedResponse(_)));
    }

    #[test]
    fn tool_declarations_wire_shape() {
        let tools = vec![ToolDefinition {
            name: "get_port_schedule".into(),
            description: "Terminal schedule for a date".into(),
            parameters: serde_json::json!({"type": "object"}),
        }];
        let value = GeminiProvider::to_api_tools(&tools);
        assert_eq!(value[0]["functionDeclarations"][0]["name"], "get_port_schedule");
    }
}
