// ABOUTME: ShellTool - executes shell commands with cwd set to the sandbox root.
// ABOUTME: Denylisted commands are rejected without being spawned.

use std::process::Stdio;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use super::{CommandFilter, Sandbox};
use crate::tool::{Tool, ToolArgs, ToolParameter, ToolResult, parse_args};

/// Tool for executing shell commands.
/// Uses `sh -c` on Unix and `cmd.exe /C` on Windows.
pub struct ShellTool {
    sandbox: Arc<Sandbox>,
    filter: Arc<CommandFilter>,
}

impl ShellTool {
    pub fn new(sandbox: Arc<Sandbox>, filter: Arc<CommandFilter>) -> Self {
        Self { sandbox, filter }
    }
}

#[async_trait]
impl Tool for ShellTool {
    fn name(&self) -> &str {
        "shell"
    }

    fn description(&self) -> &str {
        "Execute a shell command in the working directory and return its combined output. \
         Use for running tests, builds, git commands, etc."
    }

    fn parameters(&self) -> Vec<ToolParameter> {
        vec![ToolParameter::required("command", "The shell command to execute")]
    }

    async fn execute(&self, args: &ToolArgs) -> ToolResult {
        #[derive(Deserialize)]
        struct Params {
            command: String,
        }
        let params: Params = match parse_args(args) {
            Ok(p) => p,
            Err(e) => return ToolResult::error(e),
        };

        if let Some(blocked) = self.filter.check(&params.command) {
            tracing::warn!(reason = %blocked.reason, "blocked shell command");
            return ToolResult::error(format!("Blocked: {}", blocked.reason)).with_data(
                serde_json::json!({ "blocked": true, "reason": blocked.reason }),
            );
        }

        let mut cmd = if cfg!(target_os = "windows") {
            let mut c = tokio::process::Command::new("cmd.exe");
            c.arg("/C").arg(&params.command);
            c
        } else {
            let mut c = tokio::process::Command::new("sh");
            c.arg("-c").arg(&params.command);
            c
        };
        cmd.current_dir(self.sandbox.root());
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let output = match cmd.output().await {
            Ok(o) => o,
            Err(e) => return ToolResult::error(format!("Failed to spawn shell: {}", e)),
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        let mut merged = stdout.to_string();
        if !stderr.is_empty() {
            if !merged.is_empty() && !merged.ends_with('\n') {
                merged.push('\n');
            }
            merged.push_str(&stderr);
        }

        let exit_code = output.status.code();
        let data = serde_json::json!({ "exit_code": exit_code });
        if output.status.success() {
            ToolResult::text(merged).with_data(data)
        } else {
            ToolResult::error(format!(
                "Command failed with exit code {}\n{}",
                exit_code.unwrap_or(-1),
                merged
            ))
            .with_data(data)
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn tool(dir: &TempDir) -> ShellTool {
        ShellTool::new(
            Arc::new(Sandbox::new(dir.path()).unwrap()),
            Arc::new(CommandFilter::default()),
        )
    }

    fn args(command: &str) -> ToolArgs {
        ToolArgs::from([("command".to_string(), command.to_string())])
    }

    #[tokio::test]
    async fn test_shell_echo() {
        let dir = TempDir::new().unwrap();
        let result = tool(&dir).execute(&args("echo Hello, world!")).await;

        assert!(result.success);
        assert!(result.output.contains("Hello, world!"));
    }

    #[tokio::test]
    async fn test_shell_runs_in_working_directory() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("marker.txt"), "").unwrap();

        let result = tool(&dir).execute(&args("ls")).await;

        assert!(result.success);
        assert!(result.output.contains("marker.txt"));
    }

    #[tokio::test]
    async fn test_shell_merges_stderr() {
        let dir = TempDir::new().unwrap();
        let result = tool(&dir).execute(&args("echo out; echo err 1>&2")).await;

        assert!(result.success);
        assert!(result.output.contains("out"));
        assert!(result.output.contains("err"));
    }

    #[tokio::test]
    async fn test_shell_failing_command() {
        let dir = TempDir::new().unwrap();
        let result = tool(&dir).execute(&args("exit 3")).await;

        assert!(!result.success);
        assert!(result.output.contains("exit code 3"));
    }

    #[tokio::test]
    async fn test_shell_blocks_destructive_command() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("keep.txt"), "still here").unwrap();

        let result = tool(&dir).execute(&args("rm -rf /")).await;

        assert!(!result.success);
        assert!(result.output.contains("Blocked"));
        assert_eq!(result.data.as_ref().unwrap()["blocked"], true);
        assert!(dir.path().join("keep.txt").exists());
    }
}
