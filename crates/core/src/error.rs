//! Error types for the portcall domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all portcall operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Model provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Booking backend errors ---
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    // --- Tool errors ---
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Failures while talking to the language model. Fatal to the current
/// request: the loop never converts these into conversation turns.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    Api { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Malformed model response: {0}")]
    MalformedResponse(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

/// Failures while talking to the booking backend. Always recoverable:
/// the tool dispatcher captures these into an error payload and the
/// conversation continues.
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("backend request failed: {message} (status: {status_code})")]
    Api { status_code: u16, message: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("malformed backend payload: {0}")]
    Decode(String),
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("invalid tool arguments: {0}")]
    InvalidArguments(String),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_displays_correctly() {
        let err = Error::Provider(ProviderError::Api {
            status_code: 503,
            message: "upstream unavailable".into(),
        });
        assert!(err.to_string().contains("503"));
        assert!(err.to_string().contains("upstream unavailable"));
    }

    #[test]
    fn backend_error_wraps_into_tool_error() {
        let err = ToolError::from(BackendError::NotFound("booking BK999".into()));
        assert!(err.to_string().contains("BK999"));
    }

    #[test]
    fn forbidden_displays_reason() {
        let err = Error::Backend(BackendError::Forbidden(
            "booking belongs to another user".into(),
        ));
        assert!(err.to_string().contains("another user"));
    }
}
