//! Tool dispatch — mapping a model invocation to a catalog tool and
//! capturing the result.
//!
//! Dispatch is total. Unknown names, bad arguments, and backend failures
//! all come back as `ToolPayload::Error` so the orchestration loop can
//! always hand the model an answer turn and keep the conversation going.

use portcall_core::tool::ToolCatalog;
use portcall_core::provider::ToolDefinition;
use portcall_core::turn::{ToolInvocation, ToolOutcome};
use tracing::{debug, warn};

pub struct ToolDispatcher {
    catalog: ToolCatalog,
}

impl ToolDispatcher {
    pub fn new(catalog: ToolCatalog) -> Self {
        Self { catalog }
    }

    /// Tool definitions to advertise alongside the conversation.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.catalog.definitions()
    }

    /// Execute one invocation. Never returns an error — failures are
    /// captured in the outcome payload.
    pub async fn dispatch(&self, call: &ToolInvocation) -> ToolOutcome {
        let Some(tool) = self.catalog.get(&call.name) else {
            // Catalog/model mismatch; answer the model rather than abort.
            warn!(tool = %call.name, "Model requested a tool not in the catalog");
            return ToolOutcome::error(
                &call.id,
                &call.name,
                format!("Unknown function: {}", call.name),
            );
        };

        debug!(tool = %call.name, "Dispatching tool invocation");

        match tool.execute(call.arguments.clone()).await {
            Ok(payload) => ToolOutcome::success(&call.id, &call.name, payload),
            Err(e) => {
                warn!(tool = %call.name, error = %e, "Tool execution failed");
                ToolOutcome::error(&call.id, &call.name, e.to_string())
            }
        }
    }
}
