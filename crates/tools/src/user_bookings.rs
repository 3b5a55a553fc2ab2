//! `get_user_bookings` — a user's bookings for a specific date and hour.

use async_trait::async_trait;
use portcall_core::backend::PortBackend;
use portcall_core::error::ToolError;
use portcall_core::tool::Tool;
use serde_json::json;
use std::sync::Arc;

pub struct UserBookingsTool {
    backend: Arc<dyn PortBackend>,
    default_user_id: String,
}

impl UserBookingsTool {
    pub fn new(backend: Arc<dyn PortBackend>, default_user_id: impl Into<String>) -> Self {
        Self {
            backend,
            default_user_id: default_user_id.into(),
        }
    }
}

#[async_trait]
impl Tool for UserBookingsTool {
    fn name(&self) -> &str {
        "get_user_bookings"
    }

    fn description(&self) -> &str {
        "List a user's port bookings for a specific date and hour. Returns an empty list when the user has no bookings in that slot."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "user_id": {
                    "type": "string",
                    "description": "The id of the user. Defaults to the current user."
                },
                "date": {
                    "type": "string",
                    "description": "The date to look up, formatted YYYY-MM-DD"
                },
                "hour": {
                    "type": "string",
                    "description": "The starting hour of the timeslot, e.g. \"14\""
                }
            },
            "required": ["date", "hour"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        let date = arguments["date"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("missing 'date' argument".into()))?;
        let hour = arguments["hour"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("missing 'hour' argument".into()))?;
        let user_id = arguments["user_id"]
            .as_str()
            .unwrap_or(&self.default_user_id);

        let bookings = self.backend.user_bookings(user_id, date, hour).await?;

        Ok(json!({
            "bookings": bookings
                .iter()
                .map(|b| json!({
                    "booking_id": b.booking_id,
                    "status": b.status,
                    "date": b.timeslot.date,
                    "hour": b.timeslot.hour_start,
                }))
                .collect::<Vec<_>>()
        }))
    }
}
