//! `get_booking_status` — look up one booking by its id.

use async_trait::async_trait;
use portcall_core::backend::PortBackend;
use portcall_core::error::ToolError;
use portcall_core::tool::Tool;
use serde_json::json;
use std::sync::Arc;

pub struct BookingStatusTool {
    backend: Arc<dyn PortBackend>,
    default_user_id: String,
}

impl BookingStatusTool {
    pub fn new(backend: Arc<dyn PortBackend>, default_user_id: impl Into<String>) -> Self {
        Self {
            backend,
            default_user_id: default_user_id.into(),
        }
    }
}

#[async_trait]
impl Tool for BookingStatusTool {
    fn name(&self) -> &str {
        "get_booking_status"
    }

    fn description(&self) -> &str {
        "Look up the current status of a port booking by its booking id. Returns the booking's status, date, and start hour."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "booking_id": {
                    "type": "string",
                    "description": "The booking id, e.g. BK123"
                },
                "user_id": {
                    "type": "string",
                    "description": "The id of the user who owns the booking. Defaults to the current user."
                }
            },
            "required": ["booking_id"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        let booking_id = arguments["booking_id"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("missing 'booking_id' argument".into()))?;

        // Omitted user_id falls back to the configured single-tenant identity.
        let user_id = arguments["user_id"]
            .as_str()
            .unwrap_or(&self.default_user_id);

        let booking = self.backend.booking_status(booking_id, user_id).await?;

        Ok(json!({
            "booking_id": booking.booking_id,
            "status": booking.status,
            "date": booking.timeslot.date,
            "hour": booking.timeslot.hour_start,
        }))
    }
}
