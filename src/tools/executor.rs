//! Tool executor: runs one tool call and wraps the result as a [`ToolOutcome`].
//!
//! Arguments are checked against the tool's input schema first so the model
//! gets a precise message for missing or mistyped keys. Any error raised by
//! the handler is converted to [`ToolOutcome::Failure`]; nothing propagates
//! to the orchestrator.

use serde_json::Value;
use tracing::{debug, warn};

use super::Tool;
use crate::transcript::ToolOutcome;

/// Execute `tool` with the model's raw arguments.
pub async fn execute(tool: &dyn Tool, arguments: &Value) -> ToolOutcome {
    if let Err(msg) = tool.input_schema().validate(arguments) {
        debug!(tool = tool.name(), error = %msg, "rejected tool arguments");
        return ToolOutcome::failure(format!("Invalid arguments: {msg}"));
    }

    match tool.execute(arguments.clone()).await {
        Ok(output) => {
            debug!(tool = tool.name(), "tool succeeded");
            ToolOutcome::Success { output }
        }
        Err(e) => {
            warn!(tool = tool.name(), error = %e, "tool failed");
            ToolOutcome::failure(e.to_string())
        }
    }
}
