//! `get_port_schedule` — the terminal's capacity schedule for a date.

use async_trait::async_trait;
use portcall_core::backend::PortBackend;
use portcall_core::error::ToolError;
use portcall_core::tool::Tool;
use serde_json::json;
use std::sync::Arc;

pub struct PortScheduleTool {
    backend: Arc<dyn PortBackend>,
}

impl PortScheduleTool {
    pub fn new(backend: Arc<dyn PortBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl Tool for PortScheduleTool {
    fn name(&self) -> &str {
        "get_port_schedule"
    }

    fn description(&self) -> &str {
        "Get the port terminal's hourly schedule for a date, including maximum, booked, and available capacity per slot. Dates with no data return an empty schedule."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "date": {
                    "type": "string",
                    "description": "The date to look up, formatted YYYY-MM-DD"
                }
            },
            "required": ["date"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        let date = arguments["date"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("missing 'date' argument".into()))?;

        let schedule = self.backend.port_schedule(date).await?;

        Ok(json!({
            "date": schedule.date,
            "slots": schedule
                .schedule
                .iter()
                .map(|slot| json!({
                    "hour": slot.hour_start,
                    "max_capacity": slot.max_capacity,
                    "booked_capacity": slot.booked_capacity,
                    "available": slot.available(),
                }))
                .collect::<Vec<_>>()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MockBackend, slot};
    use portcall_core::booking::PortSchedule;
    use portcall_core::error::BackendError;
    use serde_json::json;

    #[tokio::test]
    async fn flattens_slots_with_derived_availability() {
        let backend = MockBackend::default().with_schedule(PortSchedule {
            date: "2024-02-07".into(),
            schedule: vec![slot("14", 10, 4), slot("15", 8, 8)],
        });
        let tool = PortScheduleTool::new(Arc::new(backend));

        let payload = tool.execute(json!({"date": "2024-02-07"})).await.unwrap();

        assert_eq!(payload["date"], "2024-02-07");
        let slots = payload["slots"].as_array().unwrap();
        assert_eq!(slots[0]["hour"], "14");
        assert_eq!(slots[0]["available"], 6);
        assert_eq!(slots[1]["available"], 0);
    }

    #[tokio::test]
    async fn unknown_date_is_an_empty_schedule() {
        let tool = PortScheduleTool::new(Arc::new(MockBackend::default()));
        let payload = tool.execute(json!({"date": "2030-01-01"})).await.unwrap();
        assert_eq!(payload, json!({"date": "2030-01-01", "slots": []}));
    }

    #[tokio::test]
    async fn unknown_terminal_surfaces_not_found() {
        let backend = MockBackend::failing(BackendError::NotFound("terminal T9".into()));
        let tool = PortScheduleTool::new(Arc::new(backend));
        let err = tool.execute(json!({"date": "2024-02-07"})).await.unwrap_err();
        assert!(matches!(err, ToolError::Backend(BackendError::NotFound(_))));
    }
}
