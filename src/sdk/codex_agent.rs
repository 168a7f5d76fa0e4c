// ABOUTME: CodexSdkAgent - runs a task through the Codex SDK with the sandboxed
// ABOUTME: tools as strict function tools, mapping thread events onto callbacks.

use std::sync::Arc;

use async_trait::async_trait;
use futures::{FutureExt, StreamExt};
use serde_json::Value;

use super::bridge::{ToolBridge, args_from_json};
use super::codex::{
    CodexFunctionTool, CodexRun, CodexSdk, CodexToolOutput, PatchChangeKind, ThreadEvent,
    ThreadItemDetails,
};
use super::{SdkProgress, cancelled_run, fail_run, finish_run, sdk_task_prompt, unavailable_run};
use crate::agent::{CancelFlag, Provider, SubAgent};
use crate::config::TraceLimits;
use crate::redact::RedactionFilter;
use crate::task::{ExecutionContext, FileChangeKind, MessagePriority, Task, TaskResult};
use crate::tool::{ToolDefinition, ToolResult};
use crate::trace::{LoopStatus, TraceRecorder};

const SDK_NAME: &str = "Codex SDK";

/// Sub-agent backed by the Codex SDK.
pub struct CodexSdkAgent {
    sdk: Option<Arc<dyn CodexSdk>>,
    skip_git_repo_check: bool,
    limits: TraceLimits,
    redactor: Arc<RedactionFilter>,
    cancel: CancelFlag,
}

impl CodexSdkAgent {
    /// `None` models an SDK that could not be loaded; every task then fails
    /// with a diagnostic.
    pub fn new(sdk: Option<Arc<dyn CodexSdk>>) -> Self {
        Self {
            sdk,
            skip_git_repo_check: true,
            limits: TraceLimits::default(),
            redactor: Arc::new(RedactionFilter::new()),
            cancel: CancelFlag::new(),
        }
    }

    /// Require the working directory to be a git repository.
    pub fn require_git_repo(mut self) -> Self {
        self.skip_git_repo_check = false;
        self
    }

    pub fn trace_limits(mut self, limits: TraceLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn redaction(mut self, redactor: RedactionFilter) -> Self {
        self.redactor = Arc::new(redactor);
        self
    }

    fn is_cancelled(&self, ctx: &ExecutionContext) -> bool {
        self.cancel.is_cancelled() || ctx.cancelled()
    }
}

/// Strict-mode parameter schema: every property is listed as required and
/// optional ones accept `null` instead.
pub fn strict_parameters_schema(definition: &ToolDefinition) -> Value {
    let mut properties = serde_json::Map::new();
    for p in &definition.parameters {
        let kind = if p.required {
            serde_json::json!("string")
        } else {
            serde_json::json!(["string", "null"])
        };
        properties.insert(
            p.name.clone(),
            serde_json::json!({
                "type": kind,
                "description": p.description,
            }),
        );
    }
    let required: Vec<&str> = definition
        .parameters
        .iter()
        .map(|p| p.name.as_str())
        .collect();

    serde_json::json!({
        "type": "object",
        "properties": properties,
        "required": required,
        "additionalProperties": false,
    })
}

/// Wrap every bridged tool as a strict function tool.
pub fn codex_function_tools(bridge: &ToolBridge) -> Vec<CodexFunctionTool> {
    bridge
        .tools()
        .definitions()
        .into_iter()
        .map(|definition| {
            let bridge = bridge.clone();
            let tool_name = definition.name.clone();
            CodexFunctionTool {
                parameters: strict_parameters_schema(&definition),
                name: definition.name,
                description: definition.description,
                strict: true,
                handler: Arc::new(move |arguments: String| {
                    let bridge = bridge.clone();
                    let tool_name = tool_name.clone();
                    async move {
                        let parsed = serde_json::from_str::<Value>(&arguments)
                            .map_err(|e| format!("Invalid tool arguments: {}", e))
                            .and_then(|value| args_from_json(&value));
                        let result = match parsed {
                            Ok(args) => bridge.invoke(&tool_name, args).await,
                            Err(e) => ToolResult::error(e),
                        };
                        CodexToolOutput {
                            output: result.output,
                            success: result.success,
                        }
                    }
                    .boxed()
                }),
            }
        })
        .collect()
}

#[async_trait]
impl SubAgent for CodexSdkAgent {
    fn provider(&self) -> Provider {
        Provider::Codex
    }

    async fn execute(&self, task: &Task, ctx: ExecutionContext) -> TaskResult {
        self.cancel.reset();

        let recorder = Arc::new(TraceRecorder::new(
            &task.id,
            &ctx,
            self.redactor.clone(),
            self.limits,
        ));
        let bridge = ToolBridge::new(
            ctx.tools.clone(),
            ctx.working_directory.clone(),
            recorder.clone(),
        );

        let Some(sdk) = &self.sdk else {
            return unavailable_run(&recorder, SDK_NAME);
        };

        let run = CodexRun {
            prompt: sdk_task_prompt(task, &ctx.working_directory),
            working_directory: ctx.working_directory.clone(),
            tools: codex_function_tools(&bridge),
            skip_git_repo_check: self.skip_git_repo_check,
        };

        tracing::info!(task_id = %task.id, sdk = SDK_NAME, "starting SDK run");
        recorder.status(0, LoopStatus::Started, Some(&task.name));
        let mut progress = SdkProgress::start(&ctx);

        let mut stream = match sdk.run_streamed(run).await {
            Ok(stream) => stream,
            Err(e) => return fail_run(&bridge, e.to_string()).await,
        };

        let mut last_message: Option<String> = None;
        while let Some(item) = stream.next().await {
            if self.is_cancelled(&ctx) {
                return cancelled_run(&bridge).await;
            }

            let event = match item {
                Ok(event) => event,
                Err(e) => return fail_run(&bridge, e.to_string()).await,
            };

            match event {
                ThreadEvent::ThreadStarted { thread_id } => {
                    recorder.note(bridge.step(), &format!("thread started: {}", thread_id));
                }
                ThreadEvent::ItemCompleted { item } => {
                    let step = bridge.advance();
                    match item.details {
                        ThreadItemDetails::AgentMessage { text } => {
                            recorder.message(&text, MessagePriority::Info);
                            last_message = Some(text);
                        }
                        ThreadItemDetails::Reasoning { text } => recorder.note(step, &text),
                        ThreadItemDetails::CommandExecution {
                            command, exit_code, ..
                        } => {
                            let code = exit_code.map_or_else(|| "?".to_string(), |c| c.to_string());
                            recorder.note(step, &format!("command `{}` exited with {}", command, code));
                        }
                        ThreadItemDetails::FileChange { changes, .. } => {
                            for change in changes {
                                let kind = match change.kind {
                                    PatchChangeKind::Add => FileChangeKind::Created,
                                    PatchChangeKind::Update | PatchChangeKind::Delete => {
                                        FileChangeKind::Modified
                                    }
                                };
                                bridge.record_change(&change.path, kind).await;
                            }
                        }
                        ThreadItemDetails::McpToolCall { server, tool, status } => {
                            recorder.note(step, &format!("mcp {}/{}: {}", server, tool, status));
                        }
                        ThreadItemDetails::Error { message } => {
                            recorder.message(&message, MessagePriority::Warning);
                        }
                        ThreadItemDetails::Other => {}
                    }
                    progress.item_completed();
                }
                ThreadEvent::TurnCompleted { usage } => {
                    if let Some(usage) = usage {
                        tracing::debug!(
                            input_tokens = usage.input_tokens,
                            output_tokens = usage.output_tokens,
                            "turn completed"
                        );
                    }
                    let summary = last_message
                        .filter(|m| !m.trim().is_empty())
                        .unwrap_or_else(|| "Task completed".to_string());
                    return finish_run(&bridge, &mut progress, summary).await;
                }
                ThreadEvent::TurnFailed { error } => return fail_run(&bridge, error.message).await,
                ThreadEvent::Error { message } => return fail_run(&bridge, message).await,
                ThreadEvent::TurnStarted
                | ThreadEvent::ItemStarted { .. }
                | ThreadEvent::ItemUpdated { .. } => {}
            }
        }

        fail_run(
            &bridge,
            format!("{} stream ended without completing the turn", SDK_NAME),
        )
        .await
    }

    fn cancel(&self) {
        self.cancel.cancel();
    }
}
