//! The tool-calling orchestration loop.
//!
//! One generate request walks the state machine
//! `AwaitingModel → (Final | AwaitingTools) → AwaitingModel → … →
//! Final | Exhausted`. Tool failures become answer turns and the loop
//! continues; only a model-call failure aborts the request.

use crate::conversation::build_turns;
use portcall_core::chat::ChatMessage;
use portcall_core::error::Error;
use portcall_core::event::{DomainEvent, EventBus};
use portcall_core::provider::{ModelRequest, Provider};
use portcall_core::turn::Turn;
use portcall_tools::ToolDispatcher;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The fixed reply when the round bound is reached without a final answer.
pub const REASONING_LIMIT_REPLY: &str =
    "I'm sorry, I reached my maximum reasoning limit for this request.";

/// What the model's turn means for the loop.
enum Round {
    /// No tool requests — the text is the final answer.
    Final(String),
    /// One or more tool requests that must be dispatched before the next
    /// round-trip.
    Tools(Turn),
}

fn classify(turn: Turn) -> Round {
    if turn.tool_calls.is_empty() {
        Round::Final(turn.content)
    } else {
        Round::Tools(turn)
    }
}

/// Drives model round-trips and tool dispatch for one request at a time.
///
/// Built once at process start and shared; all per-request state lives on
/// the stack of [`Orchestrator::generate`].
pub struct Orchestrator {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    dispatcher: ToolDispatcher,
    system_prompt: String,

    /// Maximum model round-trips per request. The shipped default of 1
    /// means a second round of tool calls can never be dispatched.
    max_rounds: u32,

    event_bus: Arc<EventBus>,
}

impl Orchestrator {
    pub fn new(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        dispatcher: ToolDispatcher,
        system_prompt: impl Into<String>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: 0.2,
            dispatcher,
            system_prompt: system_prompt.into(),
            max_rounds: 1,
            event_bus,
        }
    }

    /// Set the maximum number of model round-trips.
    pub fn with_max_rounds(mut self, max: u32) -> Self {
        self.max_rounds = max.max(1);
        self
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Process one user message and produce the reply text.
    ///
    /// The turn sequence is rebuilt from scratch on every call; nothing is
    /// cached between requests.
    pub async fn generate(
        &self,
        user_id: &str,
        message: &str,
        history: &[ChatMessage],
    ) -> Result<String, Error> {
        info!(
            user_id = %user_id,
            history_len = history.len(),
            "Processing generate request"
        );

        let mut turns = build_turns(&self.system_prompt, user_id, history, message);
        let tools = self.dispatcher.definitions();
        let mut tokens_used = 0u32;

        for round in 1..=self.max_rounds {
            debug!(round, turns = turns.len(), "Awaiting model");

            let response = self
                .provider
                .generate(ModelRequest {
                    model: self.model.clone(),
                    turns: turns.clone(),
                    tools: tools.clone(),
                    temperature: self.temperature,
                })
                .await?;

            if let Some(usage) = response.usage {
                tokens_used += usage.total_tokens;
            }

            match classify(response.turn) {
                Round::Final(text) => {
                    debug!(round, "Model produced final text");
                    self.event_bus.publish(DomainEvent::ReplyGenerated {
                        user_id: user_id.to_string(),
                        model: response.model,
                        rounds: round,
                        tokens_used,
                        timestamp: chrono::Utc::now(),
                    });
                    return Ok(text);
                }
                Round::Tools(model_turn) => {
                    debug!(
                        round,
                        requested = model_turn.tool_calls.len(),
                        "Model requested tools"
                    );

                    let calls = model_turn.tool_calls.clone();
                    turns.push(model_turn);

                    // Sequential, in emission order; the combined answer
                    // turn preserves that order.
                    let mut outcomes = Vec::with_capacity(calls.len());
                    for call in &calls {
                        let start = std::time::Instant::now();
                        let outcome = self.dispatcher.dispatch(call).await;
                        self.event_bus.publish(DomainEvent::ToolDispatched {
                            tool_name: call.name.clone(),
                            success: outcome.is_success(),
                            duration_ms: start.elapsed().as_millis() as u64,
                            timestamp: chrono::Utc::now(),
                        });
                        outcomes.push(outcome);
                    }
                    turns.push(Turn::tool_results(outcomes));
                }
            }
        }

        warn!(
            user_id = %user_id,
            max_rounds = self.max_rounds,
            "Round bound reached without a final reply"
        );
        self.event_bus.publish(DomainEvent::ReasoningLimitReached {
            user_id: user_id.to_string(),
            rounds: self.max_rounds,
            timestamp: chrono::Utc::now(),
        });
        Ok(REASONING_LIMIT_REPLY.into())
    }
}
