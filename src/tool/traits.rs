// ABOUTME: Defines the Tool trait - the core abstraction for sandboxed operations.
// ABOUTME: Tools have a name, description, string parameters, and an async execute.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Serialize;

use super::ToolResult;

/// Arguments of one tool invocation. The text protocol has no types, so
/// every value is a string.
pub type ToolArgs = HashMap<String, String>;

/// One named parameter of a tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolParameter {
    pub name: String,
    pub description: String,
    pub required: bool,
}

impl ToolParameter {
    /// A parameter the caller must supply.
    pub fn required(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            required: true,
        }
    }

    /// A parameter with a default.
    pub fn optional(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            required: false,
        }
    }
}

/// Backend-neutral description of a tool, used to build prompts and to
/// register the tool with agent SDKs.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Vec<ToolParameter>,
}

impl ToolDefinition {
    /// Render a JSON Schema object where every parameter is a string field.
    pub fn input_schema(&self) -> serde_json::Value {
        let mut properties = serde_json::Map::new();
        for p in &self.parameters {
            properties.insert(
                p.name.clone(),
                serde_json::json!({
                    "type": "string",
                    "description": p.description,
                }),
            );
        }
        let required: Vec<&str> = self
            .parameters
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect();

        serde_json::json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

/// A sandboxed operation that can be executed by a sub-agent.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Returns the unique name of this tool.
    fn name(&self) -> &str;

    /// Returns a human-readable description for the model.
    fn description(&self) -> &str;

    /// Returns the tool's parameters.
    fn parameters(&self) -> Vec<ToolParameter>;

    /// Returns the backend-neutral definition of this tool.
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters(),
        }
    }

    /// Execute the tool. Failures are reported through `ToolResult::success`.
    async fn execute(&self, args: &ToolArgs) -> ToolResult;
}

/// Deserialize string arguments into a typed parameter struct.
///
/// Missing required fields become a readable message suitable for a failed
/// `ToolResult`.
pub fn parse_args<T: serde::de::DeserializeOwned>(args: &ToolArgs) -> Result<T, String> {
    let value = serde_json::to_value(args).map_err(|e| e.to_string())?;
    serde_json::from_value(value).map_err(|e| format!("Invalid arguments: {}", e))
}
