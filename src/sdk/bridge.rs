// ABOUTME: ToolBridge - exposes registry tools to agent SDKs as native handlers,
// ABOUTME: tracing each call, tracking file changes, and refusing after cancel.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use serde_json::Value;
use tokio::sync::Mutex;

use crate::agent::{CANCELLED, run_tool};
use crate::protocol::ToolCall;
use crate::task::{FileChangeKind, FileTracker, MessagePriority, file_message};
use crate::tool::{Registry, ToolArgs, ToolResult};
use crate::trace::TraceRecorder;

/// Shared state between an SDK adapter's event loop and the tool handlers it
/// registered with the SDK. Clones share everything.
#[derive(Clone)]
pub struct ToolBridge {
    tools: Registry,
    working_directory: PathBuf,
    files: Arc<Mutex<FileTracker>>,
    exec: Arc<Mutex<()>>,
    recorder: Arc<TraceRecorder>,
    stopped: Arc<AtomicBool>,
    step: Arc<AtomicUsize>,
}

impl ToolBridge {
    pub fn new(tools: Registry, working_directory: PathBuf, recorder: Arc<TraceRecorder>) -> Self {
        Self {
            tools,
            working_directory,
            files: Arc::new(Mutex::new(FileTracker::new())),
            exec: Arc::new(Mutex::new(())),
            recorder,
            stopped: Arc::new(AtomicBool::new(false)),
            step: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn tools(&self) -> &Registry {
        &self.tools
    }

    pub fn recorder(&self) -> &TraceRecorder {
        &self.recorder
    }

    /// Refuse all further tool calls.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Current step, used as the trace iteration for SDK runs.
    pub fn step(&self) -> usize {
        self.step.load(Ordering::SeqCst)
    }

    /// Advance the step counter; returns the new value.
    pub fn advance(&self) -> usize {
        self.step.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Run one tool on behalf of the SDK. Calls are serialized: the SDK may
    /// dispatch handlers concurrently, but they share one sandbox.
    pub async fn invoke(&self, name: &str, args: ToolArgs) -> ToolResult {
        let _running = self.exec.lock().await;
        if self.is_stopped() {
            return ToolResult::error(CANCELLED);
        }

        let step = self.step();
        let call = ToolCall {
            name: name.to_string(),
            args,
        };
        self.recorder.tool_call(step, &call);
        let result = run_tool(&self.tools, &call.name, &call.args).await;
        self.recorder.tool_result(step, &call.name, &result);

        let recorded = self.files.lock().await.record_tool_result(&call.name, &result);
        if let Some((path, kind)) = recorded {
            self.announce(&path, kind);
        }
        result
    }

    /// Record a file change reported by the SDK itself. `path` may be
    /// absolute; paths under the working directory are stored relative.
    pub async fn record_change(&self, path: &str, kind: FileChangeKind) {
        let relative = self.relative(path);
        let added = self.files.lock().await.record(relative.clone(), kind);
        if added {
            self.announce(&relative, kind);
        }
    }

    /// Snapshot of the tracked files.
    pub async fn files(&self) -> FileTracker {
        self.files.lock().await.clone()
    }

    fn relative(&self, path: &str) -> String {
        let candidate = std::path::Path::new(path);
        match candidate.strip_prefix(&self.working_directory) {
            Ok(rel) if !rel.as_os_str().is_empty() => rel.to_string_lossy().replace('\\', "/"),
            _ => path.to_string(),
        }
    }

    fn announce(&self, relative: &str, kind: FileChangeKind) {
        self.recorder.message(
            &file_message(&self.working_directory, relative, kind),
            MessagePriority::Info,
        );
    }
}

/// Convert a JSON arguments object into string tool arguments.
///
/// Strings pass through, `null` means "not supplied", and other scalars are
/// rendered as JSON text.
pub fn args_from_json(value: &Value) -> Result<ToolArgs, String> {
    let object = match value {
        Value::Object(map) => map,
        Value::Null => return Ok(ToolArgs::new()),
        other => return Err(format!("Tool arguments must be an object, got {}", other)),
    };

    Ok(object
        .iter()
        .filter_map(|(key, value)| {
            let text = match value {
                Value::Null => return None,
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            Some((key.clone(), text))
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TraceLimits;
    use crate::redact::RedactionFilter;
    use crate::task::ExecutionContext;
    use tempfile::TempDir;

    fn bridge(dir: &TempDir) -> (ToolBridge, Arc<std::sync::Mutex<Vec<String>>>) {
        let messages = Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = messages.clone();
        let ctx = ExecutionContext::sandboxed(dir.path())
            .unwrap()
            .on_message(move |text, _| sink.lock().unwrap().push(text.to_string()));
        let recorder = Arc::new(TraceRecorder::new(
            "t",
            &ctx,
            Arc::new(RedactionFilter::new()),
            TraceLimits::default(),
        ));
        (
            ToolBridge::new(ctx.tools.clone(), ctx.working_directory.clone(), recorder),
            messages,
        )
    }

    #[test]
    fn test_args_from_json() {
        let args = args_from_json(&serde_json::json!({
            "filepath": "a.txt",
            "max_matches": 5,
            "path": null,
        }))
        .unwrap();

        assert_eq!(args.get("filepath").map(String::as_str), Some("a.txt"));
        assert_eq!(args.get("max_matches").map(String::as_str), Some("5"));
        assert!(!args.contains_key("path"));

        assert!(args_from_json(&serde_json::json!(["a"])).is_err());
        assert!(args_from_json(&Value::Null).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invoke_tracks_files_and_announces() {
        let dir = TempDir::new().unwrap();
        let (bridge, messages) = bridge(&dir);
        let args = ToolArgs::from([
            ("filepath".to_string(), "out.txt".to_string()),
            ("content".to_string(), "hi".to_string()),
        ]);

        let result = bridge.invoke("write_file", args).await;

        assert!(result.success);
        assert_eq!(bridge.files().await.created(), ["out.txt"]);
        assert!(messages.lock().unwrap()[0].starts_with("FILE created: out.txt"));
    }

    #[tokio::test]
    async fn test_stopped_bridge_refuses() {
        let dir = TempDir::new().unwrap();
        let (bridge, _) = bridge(&dir);
        bridge.stop();

        let args = ToolArgs::from([
            ("filepath".to_string(), "out.txt".to_string()),
            ("content".to_string(), "hi".to_string()),
        ]);
        let result = bridge.invoke("write_file", args).await;

        assert!(!result.success);
        assert_eq!(result.output, "Cancelled by user");
        assert!(!dir.path().join("out.txt").exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_concurrent_invokes_do_not_interleave() {
        let dir = TempDir::new().unwrap();
        let (bridge, _) = bridge(&dir);
        let command = |tag: &str| {
            ToolArgs::from([(
                "command".to_string(),
                format!("echo start-{tag} >> log; sleep 0.2; echo end-{tag} >> log"),
            )])
        };

        let (a, b) = tokio::join!(
            bridge.invoke("shell", command("a")),
            bridge.invoke("shell", command("b"))
        );

        assert!(a.success && b.success);
        let log = std::fs::read_to_string(dir.path().join("log")).unwrap();
        let lines: Vec<&str> = log.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0].strip_prefix("start-"), lines[1].strip_prefix("end-"));
        assert_eq!(lines[2].strip_prefix("start-"), lines[3].strip_prefix("end-"));
    }

    #[tokio::test]
    async fn test_record_change_makes_paths_relative() {
        let dir = TempDir::new().unwrap();
        let (bridge, _) = bridge(&dir);
        let absolute = bridge.working_directory.join("src/lib.rs");

        bridge
            .record_change(&absolute.to_string_lossy(), FileChangeKind::Modified)
            .await;
        bridge
            .record_change("src/lib.rs", FileChangeKind::Created)
            .await;

        let files = bridge.files().await;
        assert_eq!(files.modified(), ["src/lib.rs"]);
        assert!(files.created().is_empty());
    }
}
