// ABOUTME: ListFilesTool - non-recursive directory listing inside the sandbox.
// ABOUTME: Shows directories with [dir] prefix, sorted by name.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use super::Sandbox;
use crate::tool::{Tool, ToolArgs, ToolParameter, ToolResult, parse_args};

/// Tool for listing the entries of one directory.
pub struct ListFilesTool {
    sandbox: Arc<Sandbox>,
}

impl ListFilesTool {
    pub fn new(sandbox: Arc<Sandbox>) -> Self {
        Self { sandbox }
    }
}

#[async_trait]
impl Tool for ListFilesTool {
    fn name(&self) -> &str {
        "list_files"
    }

    fn description(&self) -> &str {
        "List the files and directories directly inside a directory (not recursive)."
    }

    fn parameters(&self) -> Vec<ToolParameter> {
        vec![ToolParameter::optional(
            "path",
            "Directory to list, relative to the working directory (default: .)",
        )]
    }

    async fn execute(&self, args: &ToolArgs) -> ToolResult {
        #[derive(Deserialize, Default)]
        struct Params {
            path: Option<String>,
        }
        let params: Params = parse_args(args).unwrap_or_default();
        let requested = params.path.unwrap_or_else(|| ".".to_string());

        let dir = match self.sandbox.resolve(&requested) {
            Ok(p) => p,
            Err(e) => return ToolResult::error(e.to_string()),
        };

        let read_dir = match std::fs::read_dir(&dir) {
            Ok(rd) => rd,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return ToolResult::error(format!("Directory not found: {}", requested));
            }
            Err(e) => return ToolResult::error(format!("Failed to list {}: {}", requested, e)),
        };

        let mut entries: Vec<(String, bool)> = read_dir
            .flatten()
            .map(|entry| {
                let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
                (entry.file_name().to_string_lossy().to_string(), is_dir)
            })
            .collect();
        entries.sort();

        let lines: Vec<String> = entries
            .iter()
            .map(|(name, is_dir)| {
                let prefix = if *is_dir { "[dir] " } else { "" };
                format!("{}{}", prefix, name)
            })
            .collect();

        let output = if lines.is_empty() {
            "No files found".to_string()
        } else {
            lines.join("\n")
        };
        ToolResult::text(output).with_data(serde_json::json!({ "entries": lines }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn tool(dir: &TempDir) -> ListFilesTool {
        ListFilesTool::new(Arc::new(Sandbox::new(dir.path()).unwrap()))
    }

    #[tokio::test]
    async fn test_list_files() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("b.txt"), "").unwrap();
        std::fs::write(dir.path().join("a.txt"), "").unwrap();
        std::fs::create_dir(dir.path().join("subdir")).unwrap();
        std::fs::write(dir.path().join("subdir/nested.txt"), "").unwrap();

        let result = tool(&dir).execute(&ToolArgs::new()).await;

        assert!(result.success);
        assert_eq!(result.output, "a.txt\nb.txt\n[dir] subdir");
        assert!(!result.output.contains("nested.txt"));
    }

    #[tokio::test]
    async fn test_list_subdirectory() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("src")).unwrap();
        std::fs::write(dir.path().join("src/lib.rs"), "").unwrap();

        let args = ToolArgs::from([("path".to_string(), "src".to_string())]);
        let result = tool(&dir).execute(&args).await;

        assert!(result.success);
        assert_eq!(result.output, "lib.rs");
    }

    #[tokio::test]
    async fn test_list_files_empty() {
        let dir = TempDir::new().unwrap();
        let result = tool(&dir).execute(&ToolArgs::new()).await;

        assert!(result.success);
        assert!(result.output.contains("No files found"));
    }

    #[tokio::test]
    async fn test_list_outside_root() {
        let dir = TempDir::new().unwrap();
        let args = ToolArgs::from([("path".to_string(), "../..".to_string())]);
        let result = tool(&dir).execute(&args).await;

        assert!(!result.success);
    }
}
