//! Tool trait and catalog — the declaration of callable backend lookups.
//!
//! Tools are the only way the model reaches the booking backend. All of
//! them are read-only and idempotent; a tool execution never mutates
//! backend state.

use crate::error::ToolError;
use crate::provider::ToolDefinition;
use async_trait::async_trait;
use std::collections::HashMap;

/// The core Tool trait.
///
/// Each backend lookup (booking status, user bookings, port schedule)
/// implements this trait. Tools are registered in the ToolCatalog and
/// advertised to the model alongside the conversation.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool (e.g., "get_booking_status").
    fn name(&self) -> &str;

    /// A description of what this tool does (sent to the model).
    fn description(&self) -> &str;

    /// JSON Schema describing this tool's parameters.
    fn parameters_schema(&self) -> serde_json::Value;

    /// Execute the tool, returning the flattened payload the model will
    /// reason over. Failures here are captured by the dispatcher, not
    /// surfaced to the caller of the orchestration loop.
    async fn execute(
        &self,
        arguments: serde_json::Value,
    ) -> std::result::Result<serde_json::Value, ToolError>;

    /// Convert this tool into a ToolDefinition for sending to the model.
    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

/// The static catalog of available tools.
///
/// Built once at process start; the orchestration loop uses it to
/// advertise definitions and the dispatcher uses it to look up
/// implementations.
pub struct ToolCatalog {
    tools: HashMap<String, Box<dyn Tool>>,
}

impl ToolCatalog {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool. Replaces any existing tool with the same name.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        let name = tool.name().to_string();
        self.tools.insert(name, tool);
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    /// Get all tool definitions (for sending to the model).
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|t| t.to_definition()).collect()
    }

    /// List all registered tool names.
    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(|s| s.as_str()).collect()
    }
}

impl Default for ToolCatalog {
    fn default() -> Self {
        Self::new()
    }
}
