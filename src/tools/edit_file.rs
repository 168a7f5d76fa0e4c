// ABOUTME: EditFileTool - replaces the first occurrence of a string in a file.
// ABOUTME: Fails without touching the file when the target text is absent.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use super::Sandbox;
use crate::tool::{Tool, ToolArgs, ToolParameter, ToolResult, parse_args};

/// Tool for targeted string replacement in files.
///
/// Unlike WriteFileTool which overwrites entire files, EditFileTool replaces
/// only the first occurrence of `old_str`.
pub struct EditFileTool {
    sandbox: Arc<Sandbox>,
}

impl EditFileTool {
    pub fn new(sandbox: Arc<Sandbox>) -> Self {
        Self { sandbox }
    }
}

#[derive(Deserialize)]
struct EditParams {
    filepath: String,
    old_str: String,
    new_str: String,
}

#[async_trait]
impl Tool for EditFileTool {
    fn name(&self) -> &str {
        "edit_file"
    }

    fn description(&self) -> &str {
        "Edit a file by replacing the first occurrence of old_str with new_str. \
         old_str must match exactly, including whitespace and indentation."
    }

    fn parameters(&self) -> Vec<ToolParameter> {
        vec![
            ToolParameter::required(
                "filepath",
                "Path of the file to edit, relative to the working directory",
            ),
            ToolParameter::required("old_str", "The exact text to find"),
            ToolParameter::required("new_str", "The text to replace it with"),
        ]
    }

    async fn execute(&self, args: &ToolArgs) -> ToolResult {
        let params: EditParams = match parse_args(args) {
            Ok(p) => p,
            Err(e) => return ToolResult::error(e),
        };

        if params.old_str.is_empty() {
            return ToolResult::error("old_str must not be empty");
        }

        let path = match self.sandbox.resolve(&params.filepath) {
            Ok(p) => p,
            Err(e) => return ToolResult::error(e.to_string()),
        };

        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return ToolResult::error(format!("File not found: {}", params.filepath));
            }
            Err(e) => {
                return ToolResult::error(format!(
                    "Failed to read file '{}': {}",
                    params.filepath, e
                ));
            }
        };

        if !content.contains(&params.old_str) {
            return ToolResult::error(format!(
                "Could not find the specified text in {}. Make sure old_str matches exactly, \
                 including whitespace and indentation.",
                params.filepath
            ));
        }

        let new_content = content.replacen(&params.old_str, &params.new_str, 1);
        let relative = self.sandbox.relative(&path);

        match std::fs::write(&path, &new_content) {
            Ok(()) => ToolResult::text(format!("Edited {}", relative))
                .with_data(serde_json::json!({ "filepath": relative })),
            Err(e) => ToolResult::error(format!(
                "Failed to write file '{}': {}",
                params.filepath, e
            )),
        }
    }
}
