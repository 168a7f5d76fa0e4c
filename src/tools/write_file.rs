// ABOUTME: WriteFileTool - writes content to a file inside the sandbox.
// ABOUTME: Creates parent directories if needed, overwrites existing files.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use super::Sandbox;
use crate::tool::{Tool, ToolArgs, ToolParameter, ToolResult, parse_args};

/// Tool for writing content to files.
pub struct WriteFileTool {
    sandbox: Arc<Sandbox>,
}

impl WriteFileTool {
    pub fn new(sandbox: Arc<Sandbox>) -> Self {
        Self { sandbox }
    }
}

#[async_trait]
impl Tool for WriteFileTool {
    fn name(&self) -> &str {
        "write_file"
    }

    fn description(&self) -> &str {
        "Write content to a file. Creates the file and any parent directories if they don't \
         exist, overwrites it if it does."
    }

    fn parameters(&self) -> Vec<ToolParameter> {
        vec![
            ToolParameter::required(
                "filepath",
                "Path of the file to write, relative to the working directory",
            ),
            ToolParameter::required("content", "The full content to write to the file"),
        ]
    }

    async fn execute(&self, args: &ToolArgs) -> ToolResult {
        #[derive(Deserialize)]
        struct Params {
            filepath: String,
            content: String,
        }
        let params: Params = match parse_args(args) {
            Ok(p) => p,
            Err(e) => return ToolResult::error(e),
        };

        let path = match self.sandbox.resolve(&params.filepath) {
            Ok(p) => p,
            Err(e) => return ToolResult::error(e.to_string()),
        };

        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                return ToolResult::error(format!("Failed to create directories: {}", e));
            }
        }

        let relative = self.sandbox.relative(&path);
        match std::fs::write(&path, &params.content) {
            Ok(()) => ToolResult::text(format!(
                "Wrote {} bytes to {}",
                params.content.len(),
                relative
            ))
            .with_data(serde_json::json!({
                "filepath": relative,
                "size": params.content.len(),
            })),
            Err(e) => ToolResult::error(format!("Failed to write file: {}", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn args(filepath: &str, content: &str) -> ToolArgs {
        ToolArgs::from([
            ("filepath".to_string(), filepath.to_string()),
            ("content".to_string(), content.to_string()),
        ])
    }

    #[tokio::test]
    async fn test_write_file_success() {
        let dir = TempDir::new().unwrap();
        let tool = WriteFileTool::new(Arc::new(Sandbox::new(dir.path()).unwrap()));

        let result = tool.execute(&args("test.txt", "Hello, world!")).await;

        assert!(result.success, "{}", result.output);
        assert!(result.output.contains("Wrote 13 bytes"));
        assert_eq!(result.data.as_ref().unwrap()["size"], 13);
        assert_eq!(result.data_str("filepath"), Some("test.txt"));

        let content = std::fs::read_to_string(dir.path().join("test.txt")).unwrap();
        assert_eq!(content, "Hello, world!");
    }

    #[tokio::test]
    async fn test_write_file_creates_directories() {
        let dir = TempDir::new().unwrap();
        let tool = WriteFileTool::new(Arc::new(Sandbox::new(dir.path()).unwrap()));

        let result = tool.execute(&args("nested/dir/test.txt", "Nested")).await;

        assert!(result.success);
        assert!(dir.path().join("nested/dir/test.txt").exists());
        assert_eq!(result.data_str("filepath"), Some("nested/dir/test.txt"));
    }

    #[tokio::test]
    async fn test_write_file_outside_root_touches_nothing() {
        let parent = TempDir::new().unwrap();
        let sandbox = Sandbox::new(parent.path().join("work")).unwrap();
        let tool = WriteFileTool::new(Arc::new(sandbox));

        let result = tool.execute(&args("../escape.txt", "nope")).await;

        assert!(!result.success);
        assert!(!parent.path().join("escape.txt").exists());
    }

    #[tokio::test]
    async fn test_write_file_requires_content() {
        let dir = TempDir::new().unwrap();
        let tool = WriteFileTool::new(Arc::new(Sandbox::new(dir.path()).unwrap()));
        let only_path = ToolArgs::from([("filepath".to_string(), "a.txt".to_string())]);

        let result = tool.execute(&only_path).await;

        assert!(!result.success);
        assert!(result.output.contains("content"));
        assert!(!dir.path().join("a.txt").exists());
    }
}
