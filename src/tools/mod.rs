pub mod executor;
pub mod read_file;
pub mod shell_command;
pub mod write_file;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

use crate::config::Limits;
use crate::schema::Schema;

use read_file::ReadFileTool;
use shell_command::ShellCommandTool;
use write_file::WriteFileTool;

/// Errors raised by tools and the registry.
///
/// Handler errors never leave the executor: they become a failed
/// [`ToolOutcome`](crate::transcript::ToolOutcome) the model can react to.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
    #[error("Tool '{0}' is registered more than once")]
    DuplicateTool(String),
    #[error("Command timed out after {0}s")]
    Timeout(u64),
    #[error("{0}")]
    Failed(String),
}

/// Definition sent to the LLM so it knows what tools are available.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
    pub output_schema: Value,
}

/// Every tool implements this trait.
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    /// Unique name the LLM uses to call this tool.
    fn name(&self) -> &str;

    /// Description shown to the model and to the user during approval.
    fn description(&self) -> &str;

    /// Shape of the arguments the tool accepts.
    fn input_schema(&self) -> Schema;

    /// Shape of a successful result.
    fn output_schema(&self) -> Schema;

    /// One-line summary of what this call will do, used in approval prompts.
    fn prompt(&self, input: &Value) -> Result<String, ToolError>;

    /// Extra detail printed before the approval prompt (e.g. a diff).
    fn preview(&self, _input: &Value) -> Option<String> {
        None
    }

    /// Execute the tool with the given JSON input.
    async fn execute(&self, input: Value) -> Result<Value, ToolError>;
}

/// Decode raw model arguments into a tool's typed input.
///
/// Unknown keys are ignored; missing keys and type mismatches become
/// [`ToolError::InvalidArguments`].
pub fn decode<T: DeserializeOwned>(input: &Value) -> Result<T, ToolError> {
    T::deserialize(input).map_err(|e| ToolError::InvalidArguments(e.to_string()))
}

/// Serialize a tool's typed output into the JSON carried by the outcome.
pub fn encode<T: Serialize>(output: &T) -> Result<Value, ToolError> {
    serde_json::to_value(output).map_err(|e| ToolError::Failed(e.to_string()))
}

/// Holds all registered tools and looks them up by name.
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Register a tool. Called during startup; a repeated name is a
    /// configuration error.
    pub fn register(&mut self, tool: Box<dyn Tool>) -> Result<(), ToolError> {
        if self.lookup(tool.name()).is_some() {
            return Err(ToolError::DuplicateTool(tool.name().to_string()));
        }
        self.tools.push(Arc::from(tool));
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name).cloned()
    }

    pub fn list(&self) -> &[Arc<dyn Tool>] {
        &self.tools
    }

    /// Produce definitions for the LLM (sent in the API request).
    pub fn manifest(&self) -> Vec<ToolDefinition> {
        self.tools
            .iter()
            .map(|t| ToolDefinition {
                name: t.name().to_string(),
                description: t.description().to_string(),
                input_schema: t.input_schema().to_json(),
                output_schema: t.output_schema().to_json(),
            })
            .collect()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    /// Create a registry with the built-in tools.
    ///
    /// `enabled` restricts the set by name; `None` enables every built-in.
    /// Naming a tool that does not exist is a configuration error.
    pub fn with_builtins(limits: &Limits, enabled: Option<&[String]>) -> Result<Self, ToolError> {
        let builtins: Vec<Box<dyn Tool>> = vec![
            Box::new(ShellCommandTool::new(
                limits.shell_timeout_secs,
                limits.max_output_bytes,
            )),
            Box::new(ReadFileTool::new(limits.read_max_bytes)),
            Box::new(WriteFileTool::new()),
        ];

        if let Some(names) = enabled {
            if let Some(missing) = names
                .iter()
                .find(|n| !builtins.iter().any(|t| t.name() == n.as_str()))
            {
                return Err(ToolError::UnknownTool(missing.clone()));
            }
        }

        let mut registry = Self::new();
        for tool in builtins {
            let keep = enabled.map_or(true, |names| names.iter().any(|n| n == tool.name()));
            if keep {
                registry.register(tool)?;
            }
        }
        Ok(registry)
    }
}
