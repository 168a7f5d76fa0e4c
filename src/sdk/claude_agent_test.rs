// ABOUTME: Tests for ClaudeSdkAgent against a scripted in-memory SDK that calls
// ABOUTME: the registered tool handlers and then streams canned messages.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Value, json};
use tempfile::TempDir;

use super::*;
use crate::agent::SubAgent;
use crate::error::SdkError;
use crate::task::{ExecutionContext, MessagePriority, Task};
use crate::trace::{LoopStatus, TraceEvent};

/// Scripted SDK: runs `tool_calls` through the query's tool server, then
/// yields `messages`. Optionally raises `cancel` after the first message.
#[derive(Default)]
struct FakeClaude {
    tool_calls: Vec<(String, Value)>,
    messages: Vec<ClaudeMessage>,
    cancel_after_first: Option<Arc<AtomicBool>>,
    fail_query: bool,
    seen: Mutex<Option<(String, Vec<String>)>>,
    system_prompt: Mutex<Option<String>>,
    outputs: Arc<Mutex<Vec<ClaudeToolOutput>>>,
}

#[async_trait]
impl ClaudeAgentSdk for FakeClaude {
    async fn query(&self, query: ClaudeQuery) -> Result<ClaudeMessageStream, SdkError> {
        if self.fail_query {
            return Err(SdkError::Query("authentication failed".to_string()));
        }
        *self.seen.lock().unwrap() = Some((query.prompt.clone(), query.allowed_tools.clone()));
        *self.system_prompt.lock().unwrap() = query.system_prompt.clone();

        let calls = self.tool_calls.clone();
        let messages = self.messages.clone();
        let cancel = self.cancel_after_first.clone();
        let outputs = self.outputs.clone();
        let server = query.tool_server;

        Ok(Box::pin(async_stream::stream! {
            for (name, input) in calls {
                if let Some(output) = server.call(&name, input).await {
                    outputs.lock().unwrap().push(output);
                }
            }
            for (i, message) in messages.into_iter().enumerate() {
                if i == 1 {
                    if let Some(flag) = &cancel {
                        flag.store(true, Ordering::SeqCst);
                    }
                }
                yield Ok(message);
            }
        }))
    }
}

fn assistant(text: &str) -> ClaudeMessage {
    ClaudeMessage::Assistant {
        message: ClaudeAssistantMessage {
            content: vec![ClaudeContentBlock::Text {
                text: text.to_string(),
            }],
        },
    }
}

fn success(result: Option<&str>) -> ClaudeMessage {
    ClaudeMessage::Result {
        subtype: "success".to_string(),
        is_error: false,
        result: result.map(str::to_string),
        errors: Vec::new(),
        num_turns: 1,
    }
}

struct Harness {
    dir: TempDir,
    messages: Arc<Mutex<Vec<(String, MessagePriority)>>>,
    events: Arc<Mutex<Vec<TraceEvent>>>,
    progress: Arc<Mutex<Vec<u8>>>,
}

impl Harness {
    fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
            messages: Arc::new(Mutex::new(Vec::new())),
            events: Arc::new(Mutex::new(Vec::new())),
            progress: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn context(&self) -> ExecutionContext {
        let messages = self.messages.clone();
        let events = self.events.clone();
        let progress = self.progress.clone();
        ExecutionContext::sandboxed(self.dir.path())
            .unwrap()
            .on_message(move |text, priority| {
                messages.lock().unwrap().push((text.to_string(), priority))
            })
            .on_trace(move |event| events.lock().unwrap().push(event.clone()))
            .on_progress(move |p| progress.lock().unwrap().push(p))
    }

    fn statuses(&self) -> Vec<LoopStatus> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|e| e.status())
            .collect()
    }
}

#[tokio::test]
async fn test_tools_run_through_server_and_files_are_tracked() {
    let harness = Harness::new();
    let sdk = Arc::new(FakeClaude {
        tool_calls: vec![
            (
                "mcp__handoff__write_file".to_string(),
                json!({"filepath": "notes.md", "content": "hello"}),
            ),
            (
                "mcp__handoff__read_file".to_string(),
                json!({"filepath": "notes.md"}),
            ),
        ],
        messages: vec![assistant("Wrote the notes."), success(Some("Created notes.md"))],
        ..Default::default()
    });
    let agent = ClaudeSdkAgent::new(Some(sdk.clone()));

    let result = agent
        .execute(&Task::new("Notes", "Write notes.md"), harness.context())
        .await;

    assert!(result.success, "{:?}", result.error);
    assert_eq!(result.summary, "Created notes.md");
    assert_eq!(result.files_created, ["notes.md"]);
    assert!(result.files_modified.is_empty());
    assert_eq!(
        std::fs::read_to_string(harness.dir.path().join("notes.md")).unwrap(),
        "hello"
    );

    let outputs = sdk.outputs.lock().unwrap();
    assert!(!outputs[0].is_error);
    assert!(outputs[1].text().contains("hello"));

    let (prompt, allowed) = sdk.seen.lock().unwrap().clone().unwrap();
    assert!(prompt.contains("Write notes.md"));
    assert!(allowed.contains(&"mcp__handoff__shell".to_string()));
    assert_eq!(allowed.len(), 6);

    assert_eq!(harness.statuses(), [LoopStatus::Started, LoopStatus::Done]);
    assert_eq!(harness.progress.lock().unwrap().last(), Some(&100));
    assert!(
        harness
            .messages
            .lock()
            .unwrap()
            .iter()
            .any(|(m, _)| m.starts_with("FILE created: notes.md"))
    );
}

#[tokio::test]
async fn test_summary_falls_back_to_last_assistant_text() {
    let harness = Harness::new();
    let sdk = Arc::new(FakeClaude {
        messages: vec![assistant("All tidy now."), success(None)],
        ..Default::default()
    });

    let result = ClaudeSdkAgent::new(Some(sdk))
        .execute(&Task::new("Tidy", "Tidy up"), harness.context())
        .await;

    assert!(result.success);
    assert_eq!(result.summary, "All tidy now.");
}

#[tokio::test]
async fn test_system_prompt_is_forwarded() {
    let harness = Harness::new();
    let sdk = Arc::new(FakeClaude {
        messages: vec![success(Some("ok"))],
        ..Default::default()
    });

    ClaudeSdkAgent::new(Some(sdk.clone()))
        .system_prompt("Prefer small diffs.")
        .execute(&Task::new("t", "d"), harness.context())
        .await;

    assert_eq!(
        sdk.system_prompt.lock().unwrap().as_deref(),
        Some("Prefer small diffs.")
    );
}

#[tokio::test]
async fn test_text_deltas_become_messages() {
    let harness = Harness::new();
    let delta = ClaudeMessage::StreamEvent {
        event: json!({
            "type": "content_block_delta",
            "delta": {"type": "text_delta", "text": "Working"}
        }),
    };
    let sdk = Arc::new(FakeClaude {
        messages: vec![delta, success(Some("ok"))],
        ..Default::default()
    });

    ClaudeSdkAgent::new(Some(sdk))
        .execute(&Task::new("t", "d"), harness.context())
        .await;

    assert!(
        harness
            .messages
            .lock()
            .unwrap()
            .contains(&("Working".to_string(), MessagePriority::Info))
    );
}

#[tokio::test]
async fn test_error_result_fails_with_joined_errors() {
    let harness = Harness::new();
    let sdk = Arc::new(FakeClaude {
        tool_calls: vec![(
            "write_file".to_string(),
            json!({"filepath": "half.txt", "content": "x"}),
        )],
        messages: vec![ClaudeMessage::Result {
            subtype: "error_during_execution".to_string(),
            is_error: true,
            result: None,
            errors: vec!["rate limited".to_string(), "gave up".to_string()],
            num_turns: 3,
        }],
        ..Default::default()
    });

    let result = ClaudeSdkAgent::new(Some(sdk))
        .execute(&Task::new("t", "d"), harness.context())
        .await;

    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("rate limited; gave up"));
    assert_eq!(result.files_created, ["half.txt"]);
    assert_eq!(harness.statuses().last(), Some(&LoopStatus::Error));
}

#[tokio::test]
async fn test_query_error_fails() {
    let harness = Harness::new();
    let sdk = Arc::new(FakeClaude {
        fail_query: true,
        ..Default::default()
    });

    let result = ClaudeSdkAgent::new(Some(sdk))
        .execute(&Task::new("t", "d"), harness.context())
        .await;

    assert!(!result.success);
    assert_eq!(
        result.error.as_deref(),
        Some("Query failed: authentication failed")
    );
}

#[tokio::test]
async fn test_stream_without_result_fails() {
    let harness = Harness::new();
    let sdk = Arc::new(FakeClaude {
        messages: vec![assistant("thinking...")],
        ..Default::default()
    });

    let result = ClaudeSdkAgent::new(Some(sdk))
        .execute(&Task::new("t", "d"), harness.context())
        .await;

    assert!(!result.success);
    assert!(result.error.unwrap().contains("without a result"));
}

#[tokio::test]
async fn test_cancellation_between_messages() {
    let harness = Harness::new();
    let flag = Arc::new(AtomicBool::new(false));
    let sdk = Arc::new(FakeClaude {
        messages: vec![assistant("step one"), assistant("step two"), success(Some("ok"))],
        cancel_after_first: Some(flag.clone()),
        ..Default::default()
    });
    let observed = flag.clone();
    let ctx = harness
        .context()
        .is_cancelled(move || observed.load(Ordering::SeqCst));

    let result = ClaudeSdkAgent::new(Some(sdk))
        .execute(&Task::new("t", "d"), ctx)
        .await;

    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some(crate::agent::CANCELLED));
    assert_eq!(harness.statuses().last(), Some(&LoopStatus::Cancelled));
}

#[tokio::test]
async fn test_missing_sdk_fails_with_diagnostic() {
    let harness = Harness::new();

    let result = ClaudeSdkAgent::new(None)
        .execute(&Task::new("t", "d"), harness.context())
        .await;

    assert!(!result.success);
    assert!(
        result
            .error
            .unwrap()
            .starts_with("Claude Agent SDK is not available")
    );
    assert_eq!(harness.statuses(), [LoopStatus::Error]);
}

#[tokio::test]
async fn test_tool_server_reports_tool_errors() {
    let harness = Harness::new();
    let sdk = Arc::new(FakeClaude {
        tool_calls: vec![
            (
                "mcp__handoff__read_file".to_string(),
                json!({"filepath": "../etc/passwd"}),
            ),
            ("mcp__handoff__read_file".to_string(), json!("not an object")),
        ],
        messages: vec![success(Some("done"))],
        ..Default::default()
    });

    ClaudeSdkAgent::new(Some(sdk.clone()))
        .execute(&Task::new("t", "d"), harness.context())
        .await;

    let outputs = sdk.outputs.lock().unwrap();
    assert!(outputs.iter().all(|o| o.is_error));
    assert!(outputs[1].text().contains("must be an object"));
}
