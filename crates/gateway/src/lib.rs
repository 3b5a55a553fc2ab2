//! HTTP API gateway for portcall.
//!
//! Exposes the generate endpoint and a health check, and assembles the
//! runtime (backend client, provider, tool catalog, orchestrator) from an
//! explicit `AppConfig` — there is no ambient settings lookup anywhere.
//!
//! Built on Axum. CORS is permissive; the service is deployed behind a
//! trusted frontend.

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{debug, error, info, warn};

use portcall_agent::Orchestrator;
use portcall_backend::ApiClient;
use portcall_core::backend::{HistoryStore, PortBackend};
use portcall_core::error::Error;
use portcall_core::event::{DomainEvent, EventBus};
use portcall_tools::ToolDispatcher;

/// Shared application state for the gateway.
pub struct GatewayState {
    pub agent: Arc<Orchestrator>,
    pub history: Arc<dyn HistoryStore>,
}

pub type SharedState = Arc<GatewayState>;

/// The assembled runtime, reused by the serve and ask commands.
pub struct AppContext {
    pub agent: Arc<Orchestrator>,
    pub history: Arc<dyn HistoryStore>,
    pub event_bus: Arc<EventBus>,
}

/// Build every long-lived component once from the configuration.
pub fn build_context(config: &portcall_config::AppConfig) -> Result<AppContext, Error> {
    let api = Arc::new(ApiClient::from_config(&config.backend));
    let handle = portcall_providers::from_config(config)?;
    let catalog = portcall_tools::catalog(
        api.clone() as Arc<dyn PortBackend>,
        &config.agent.default_user_id,
    );
    let event_bus = Arc::new(EventBus::default());

    let agent = Arc::new(
        Orchestrator::new(
            handle.provider,
            handle.model,
            ToolDispatcher::new(catalog),
            config.system_prompt(),
            event_bus.clone(),
        )
        .with_max_rounds(config.agent.max_rounds)
        .with_temperature(config.agent.temperature),
    );

    Ok(AppContext {
        agent,
        history: api,
        event_bus,
    })
}

/// Build the Axum router with all gateway routes.
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(health_handler))
        .route("/api/ai/generate", post(generate_handler))
        .layer(CorsLayer::permissive())
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

/// Attach a subscriber that mirrors domain events into the debug log.
pub fn spawn_event_logger(bus: &EventBus) {
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = rx.recv().await {
            match event.as_ref() {
                DomainEvent::ReplyGenerated {
                    user_id,
                    model,
                    rounds,
                    tokens_used,
                    ..
                } => debug!(user_id = %user_id, model = %model, rounds, tokens_used, "reply generated"),
                DomainEvent::ToolDispatched {
                    tool_name,
                    success,
                    duration_ms,
                    ..
                } => debug!(tool_name = %tool_name, success, duration_ms, "tool dispatched"),
                DomainEvent::ReasoningLimitReached {
                    user_id, rounds, ..
                } => debug!(user_id = %user_id, rounds, "reasoning limit reached"),
            }
        }
    });
}

/// Start the gateway HTTP server.
pub async fn start(config: portcall_config::AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let context = build_context(&config)?;
    spawn_event_logger(&context.event_bus);

    let state = Arc::new(GatewayState {
        agent: context.agent,
        history: context.history,
    });
    let app = build_router(state);

    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);
    info!(addr = %addr, "portcall gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Handlers ---

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: "portcall",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Deserialize)]
struct GenerateRequest {
    user_id: String,
    chat_id: String,
    message: String,
}

#[derive(Serialize)]
struct GenerateResponse {
    message: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

async fn generate_handler(
    State(state): State<SharedState>,
    Json(payload): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, (StatusCode, Json<ErrorResponse>)> {
    info!(chat_id = %payload.chat_id, "generate request");

    // A broken history store must not take the assistant down with it.
    let history = match state.history.chat_messages(&payload.chat_id).await {
        Ok(messages) => messages,
        Err(e) => {
            warn!(
                chat_id = %payload.chat_id,
                error = %e,
                "Could not fetch chat history, continuing with empty history"
            );
            Vec::new()
        }
    };

    match state
        .agent
        .generate(&payload.user_id, &payload.message, &history)
        .await
    {
        Ok(message) => Ok(Json(GenerateResponse { message })),
        Err(e) => {
            error!(error = %e, "Generation failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("Error generating response: {e}"),
                }),
            ))
        }
    }
}
