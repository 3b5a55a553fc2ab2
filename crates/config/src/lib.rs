//! Configuration loading and validation for portcall.
//!
//! Loads configuration from `portcall.toml` with environment variable
//! overrides, validates all settings at startup, and is passed by
//! reference into every component that needs it. There is no ambient
//! settings singleton anywhere in the workspace.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Fallback system prompt when no prompt file is configured.
pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a helpful AI assistant for a port booking system.";

/// The root configuration structure.
///
/// Maps directly to `portcall.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Which model provider to use: "gemini" or "ollama".
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Booking backend connection settings.
    #[serde(default)]
    pub backend: BackendConfig,

    /// Gemini provider settings.
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// Ollama provider settings.
    #[serde(default)]
    pub ollama: OllamaConfig,

    /// Orchestration loop settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// HTTP gateway settings.
    #[serde(default)]
    pub gateway: GatewayConfig,
}

fn default_provider() -> String {
    "gemini".into()
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("provider", &self.provider)
            .field("backend", &self.backend)
            .field("gemini", &self.gemini)
            .field("ollama", &self.ollama)
            .field("agent", &self.agent)
            .field("gateway", &self.gateway)
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the booking backend.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Bearer credential for the backend's internal tool endpoints.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_service_token: Option<String>,
}

fn default_api_base_url() -> String {
    "http://localhost:8000".into()
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            api_service_token: None,
        }
    }
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("api_base_url", &self.api_base_url)
            .field("api_service_token", &redact(&self.api_service_token))
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_gemini_model")]
    pub model: String,
}

fn default_gemini_model() -> String {
    "gemini-2.0-flash-lite".into()
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_gemini_model(),
        }
    }
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &redact(&self.api_key))
            .field("model", &self.model)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    #[serde(default = "default_ollama_base_url")]
    pub base_url: String,

    #[serde(default = "default_ollama_model")]
    pub model: String,
}

fn default_ollama_base_url() -> String {
    "http://localhost:11434".into()
}
fn default_ollama_model() -> String {
    "llama3.2".into()
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: default_ollama_base_url(),
            model: default_ollama_model(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Maximum model round-trips per request. At the shipped value of 1 a
    /// second round of tool calls can never be dispatched; raising it is a
    /// product decision, not a code change.
    #[serde(default = "default_max_rounds")]
    pub max_rounds: u32,

    /// Identity used when the model omits a user_id tool argument.
    /// Single-tenant MVP assumption — not an access control.
    #[serde(default = "default_user_id")]
    pub default_user_id: String,

    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Path to the system prompt file. Falls back to a built-in prompt
    /// when absent or unreadable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt_path: Option<PathBuf>,

    /// Override the system prompt entirely (skips file loading).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt_override: Option<String>,
}

fn default_max_rounds() -> u32 {
    1
}
fn default_user_id() -> String {
    "U456".into()
}
fn default_temperature() -> f32 {
    0.2
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_rounds: default_max_rounds(),
            default_user_id: default_user_id(),
            temperature: default_temperature(),
            system_prompt_path: None,
            system_prompt_override: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    8001
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (`portcall.toml`, or the
    /// file named by `PORTCALL_CONFIG`).
    ///
    /// Environment overrides applied after file loading:
    /// - `PORTCALL_API_BASE_URL`, `PORTCALL_API_TOKEN`
    /// - `PORTCALL_PROVIDER`, `PORTCALL_MODEL`
    /// - `GEMINI_API_KEY`
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("PORTCALL_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("portcall.toml"));
        let mut config = Self::load_from(&path)?;

        if let Ok(url) = std::env::var("PORTCALL_API_BASE_URL") {
            config.backend.api_base_url = url;
        }
        if let Ok(token) = std::env::var("PORTCALL_API_TOKEN") {
            config.backend.api_service_token = Some(token);
        }
        if let Ok(provider) = std::env::var("PORTCALL_PROVIDER") {
            config.provider = provider;
        }
        // The model override applies to whichever provider is active.
        if let Ok(model) = std::env::var("PORTCALL_MODEL") {
            match config.provider.as_str() {
                "ollama" => config.ollama.model = model,
                _ => config.gemini.model = model,
            }
        }
        if config.gemini.api_key.is_none() {
            config.gemini.api_key = std::env::var("GEMINI_API_KEY").ok();
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.agent.max_rounds == 0 {
            return Err(ConfigError::ValidationError(
                "agent.max_rounds must be at least 1".into(),
            ));
        }

        if !(0.0..=2.0).contains(&self.agent.temperature) {
            return Err(ConfigError::ValidationError(
                "agent.temperature must be between 0.0 and 2.0".into(),
            ));
        }

        match self.provider.as_str() {
            "gemini" | "ollama" => Ok(()),
            other => Err(ConfigError::ValidationError(format!(
                "unknown provider '{other}' (expected \"gemini\" or \"ollama\")"
            ))),
        }
    }

    /// Resolve the system prompt: override, then file, then the built-in
    /// fallback. A configured-but-unreadable file falls back too.
    pub fn system_prompt(&self) -> String {
        if let Some(prompt) = &self.agent.system_prompt_override {
            return prompt.clone();
        }
        if let Some(path) = &self.agent.system_prompt_path {
            match std::fs::read_to_string(path) {
                Ok(content) => return content,
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Could not read system prompt file, using fallback"
                    );
                }
            }
        }
        DEFAULT_SYSTEM_PROMPT.into()
    }

    /// Generate a default config TOML string (for documentation and
    /// onboarding).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            backend: BackendConfig::default(),
            gemini: GeminiConfig::default(),
            ollama: OllamaConfig::default(),
            agent: AgentConfig::default(),
            gateway: GatewayConfig::default(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
