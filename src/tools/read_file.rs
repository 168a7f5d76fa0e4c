// ABOUTME: ReadFileTool - reads file contents as text from inside the sandbox.
// ABOUTME: Returns file contents or a failed result if the file cannot be read.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use super::Sandbox;
use crate::tool::{Tool, ToolArgs, ToolParameter, ToolResult, parse_args};

/// Tool for reading file contents.
pub struct ReadFileTool {
    sandbox: Arc<Sandbox>,
}

impl ReadFileTool {
    pub fn new(sandbox: Arc<Sandbox>) -> Self {
        Self { sandbox }
    }
}

#[async_trait]
impl Tool for ReadFileTool {
    fn name(&self) -> &str {
        "read_file"
    }

    fn description(&self) -> &str {
        "Read the contents of a file. Returns the file contents as text."
    }

    fn parameters(&self) -> Vec<ToolParameter> {
        vec![ToolParameter::required(
            "filepath",
            "Path of the file to read, relative to the working directory",
        )]
    }

    async fn execute(&self, args: &ToolArgs) -> ToolResult {
        #[derive(Deserialize)]
        struct Params {
            filepath: String,
        }
        let params: Params = match parse_args(args) {
            Ok(p) => p,
            Err(e) => return ToolResult::error(e),
        };

        let path = match self.sandbox.resolve(&params.filepath) {
            Ok(p) => p,
            Err(e) => return ToolResult::error(e.to_string()),
        };

        match std::fs::read_to_string(&path) {
            Ok(content) => ToolResult::text(content)
                .with_data(serde_json::json!({ "filepath": self.sandbox.relative(&path) })),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                ToolResult::error(format!("File not found: {}", params.filepath))
            }
            Err(e) => ToolResult::error(format!("Failed to read file: {}", e)),
        }
    }
}
