// ABOUTME: Defines the ToolResult type - the uniform outcome of a tool call
// ABOUTME: with a success flag, text output, and optional structured data.

use serde::Serialize;

/// Result of a tool execution. Failures are values, never errors.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolResult {
    /// Whether the tool did what was asked.
    pub success: bool,

    /// Human/LLM-readable output or failure reason.
    pub output: String,

    /// Optional structured payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl ToolResult {
    /// Create a successful text result.
    pub fn text(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: output.into(),
            data: None,
        }
    }

    /// Create a failed result.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            output: message.into(),
            data: None,
        }
    }

    /// Attach structured data to the result.
    pub fn with_data(mut self, data: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(data) {
            self.data = Some(v);
        }
        self
    }

    /// Look up a string field of the structured data.
    pub fn data_str(&self, key: &str) -> Option<&str> {
        self.data.as_ref()?.get(key)?.as_str()
    }
}

impl Default for ToolResult {
    fn default() -> Self {
        Self::text("")
    }
}
