//! HTTP client for the booking backend and the chat history store.
//!
//! The backend exposes three POST-style internal tool endpoints plus the
//! chat message listing, all behind a bearer credential with JSON bodies.
//! This crate implements the `PortBackend` and `HistoryStore` trait seams
//! from `portcall-core` over reqwest; nothing else in the workspace knows
//! the wire paths.

use async_trait::async_trait;
use portcall_core::backend::{HistoryStore, PortBackend};
use portcall_core::booking::{Booking, PortSchedule};
use portcall_core::chat::ChatMessage;
use portcall_core::error::BackendError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

/// A client for one booking backend deployment.
pub struct ApiClient {
    base_url: String,
    token: Option<String>,
    client: reqwest::Client,
}

impl ApiClient {
    /// Create a new client against a backend base URL.
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
            client,
        }
    }

    /// Create a client from the backend section of the app config.
    pub fn from_config(config: &portcall_config::BackendConfig) -> Self {
        Self::new(&config.api_base_url, config.api_service_token.clone())
    }

    /// Reachability probe for diagnostics: hits the backend root and
    /// reports whether it answered with a success status.
    pub async fn ping(&self) -> Result<bool, BackendError> {
        let response = self
            .client
            .get(format!("{}/", self.base_url))
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;
        Ok(response.status().is_success())
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.header("Authorization", format!("Bearer {token}")),
            None => request,
        }
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, BackendError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "Backend POST");

        let response = self
            .authorized(self.client.post(&url))
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        Self::decode(response).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, BackendError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "Backend GET");

        let response = self
            .authorized(self.client.get(&url))
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, BackendError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_error_status(status.as_u16(), &body));
        }

        response
            .json()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))
    }
}

/// Map a non-2xx backend response to the domain error taxonomy.
fn map_error_status(status: u16, body: &str) -> BackendError {
    let message = error_detail(body);
    match status {
        404 => BackendError::NotFound(message),
        401 | 403 => BackendError::Forbidden(message),
        _ => BackendError::Api {
            status_code: status,
            message,
        },
    }
}

/// Pull the human-readable reason out of an error body. The backend wraps
/// reasons as `{"detail": ...}` or `{"message": ...}`; anything else is
/// passed through verbatim.
fn error_detail(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["detail", "message", "error"] {
            if let Some(reason) = value[key].as_str() {
                return reason.to_string();
            }
        }
    }
    body.to_string()
}

// --- Request bodies (wire format of the internal tool endpoints) ---

#[derive(Debug, Serialize)]
struct BookingStatusRequest<'a> {
    booking_id: &'a str,
    user_id: &'a str,
}

#[derive(Debug, Serialize)]
struct UserBookingsRequest<'a> {
    user_id: &'a str,
    date: &'a str,
    hour: &'a str,
}

#[derive(Debug, Serialize)]
struct PortScheduleRequest<'a> {
    date: &'a str,
}

#[async_trait]
impl PortBackend for ApiClient {
    async fn booking_status(
        &self,
        booking_id: &str,
        user_id: &str,
    ) -> Result<Booking, BackendError> {
        self.post_json(
            "/api/internal/tools/booking-status",
            &BookingStatusRequest {
                booking_id,
                user_id,
            },
        )
        .await
    }

    async fn user_bookings(
        &self,
        user_id: &str,
        date: &str,
        hour: &str,
    ) -> Result<Vec<Booking>, BackendError> {
        self.post_json(
            "/api/internal/tools/user-bookings",
            &UserBookingsRequest {
                user_id,
                date,
                hour,
            },
        )
        .await
    }

    async fn port_schedule(&self, date: &str) -> Result<PortSchedule, BackendError> {
        self.post_json(
            "/api/internal/tools/port-schedule",
            &PortScheduleRequest { date },
        )
        .await
    }
}

#[async_trait]
impl HistoryStore for ApiClient {
    async fn chat_messages(&self, chat_id: &str) -> Result<Vec<ChatMessage>, BackendError> {
        self.get_json(&format!("/api/chat/{chat_id}/messages")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_normalized() {
        let client = ApiClient::new("http://localhost:8000/", None);
        assert_eq!(client.base_url, "http://localhost:8000");
    }

    #[test]
    fn request_bodies_match_wire_format() {
        let body = serde_json::to_value(BookingStatusRequest {
            booking_id: "BK123",
            user_id: "U456",
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"booking_id": "BK123", "user_id": "U456"}));

        let body = serde_json::to_value(UserBookingsRequest {
            user_id: "U456",
            date: "2024-02-07",
            hour: "14",
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({"user_id": "U456", "date": "2024-02-07", "hour": "14"})
        );

        let body = serde_json::to_value(PortScheduleRequest { date: "2024-02-07" }).unwrap();
        assert_eq!(body, serde_json::json!({"date": "2024-02-07"}));
    }

    #[test]
    fn not_found_maps_to_domain_error() {
        let err = map_error_status(404, r#"{"detail": "Booking not found"}"#);
        assert!(matches!(err, BackendError::NotFound(ref m) if m == "Booking not found"));
    }

    #[test]
    fn forbidden_maps_to_domain_error() {
        let err = map_error_status(403, r#"{"detail": "Booking belongs to another user"}"#);
        assert!(matches!(err, BackendError::Forbidden(_)));
    }

    #[test]
    fn other_statuses_keep_code_and_body() {
        let err = map_error_status(502, "bad gateway");
        match err {
            BackendError::Api {
                status_code,
                message,
            } => {
                assert_eq!(status_code, 502);
                assert_eq!(message, "bad gateway");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn error_detail_prefers_structured_reason() {
        assert_eq!(error_detail(r#"{"message": "nope"}"#), "nope");
        assert_eq!(error_detail("plain text"), "plain text");
    }

    #[test]
    fn deserializes_chat_messages_listing() {
        let raw = r#"[
            {"message_id": "m1", "sender": "human", "message": "Hi", "index": 0, "created_at": "2024-02-07T10:00:00Z"},
            {"message_id": "m2", "sender": "agent", "message": "Hello!", "index": 1, "created_at": "2024-02-07T10:00:05Z"}
        ]"#;
        let messages: Vec<ChatMessage> = serde_json::from_str(raw).unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].message, "Hi");
    }
}
