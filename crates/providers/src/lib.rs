//! Model provider implementations for portcall.
//!
//! Two backends speak the same structured tool protocol: Gemini
//! `generateContent` (the primary) and any OpenAI-compatible chat
//! completions endpoint (Ollama and friends). The orchestration loop is
//! polymorphic over `portcall_core::Provider` and never branches on which
//! one is configured.

pub mod gemini;
pub mod openai_compat;

pub use gemini::GeminiProvider;
pub use openai_compat::OpenAiCompatProvider;

use portcall_config::AppConfig;
use portcall_core::error::{Error, ProviderError};
use portcall_core::provider::Provider;
use std::sync::Arc;

/// The provider selected by configuration, plus the model it should run.
pub struct ProviderHandle {
    pub provider: Arc<dyn Provider>,
    pub model: String,
}

impl std::fmt::Debug for ProviderHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderHandle")
            .field("provider", &self.provider.name())
            .field("model", &self.model)
            .finish()
    }
}

/// Build the configured provider.
pub fn from_config(config: &AppConfig) -> Result<ProviderHandle, Error> {
    match config.provider.as_str() {
        "gemini" => {
            let api_key = config.gemini.api_key.clone().ok_or_else(|| {
                ProviderError::NotConfigured(
                    "gemini requires an API key (gemini.api_key or GEMINI_API_KEY)".into(),
                )
            })?;
            Ok(ProviderHandle {
                provider: Arc::new(GeminiProvider::new(api_key)),
                model: config.gemini.model.clone(),
            })
        }
        "ollama" => Ok(ProviderHandle {
            provider: Arc::new(OpenAiCompatProvider::ollama(Some(&config.ollama.base_url))),
            model: config.ollama.model.clone(),
        }),
        other => Err(Error::Config {
            message: format!("unknown provider '{other}'"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portcall_config::GeminiConfig;

    #[test]
    fn gemini_without_key_is_not_configured() {
        let config = AppConfig::default();
        let err = from_config(&config).unwrap_err();
        assert!(matches!(
            err,
            Error::Provider(ProviderError::NotConfigured(_))
        ));
    }

    #[test]
    fn gemini_with_key_selects_configured_model() {
        let config = AppConfig {
            gemini: GeminiConfig {
                api_key: Some("test-key".into()),
                ..GeminiConfig::default()
            },
            ..AppConfig::default()
        };
        let handle = from_config(&config).unwrap();
        assert_eq!(handle.provider.name(), "gemini");
        assert_eq!(handle.model, "gemini-2.0-flash-lite");
    }

    #[test]
    fn ollama_needs_no_key() {
        let config = AppConfig {
            provider: "ollama".into(),
            ..AppConfig::default()
        };
        let handle = from_config(&config).unwrap();
        assert_eq!(handle.provider.name(), "ollama");
        assert_eq!(handle.model, "llama3.2");
    }
}
