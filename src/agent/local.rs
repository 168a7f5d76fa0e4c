// ABOUTME: LocalLoopAgent - drives a plain completion backend through the text
// ABOUTME: tool protocol: call, parse, run tools in order, repeat until DONE.

use std::sync::Arc;

use async_trait::async_trait;

use super::{CancelFlag, Provider, SubAgent};
use crate::backend::{CompletionBackend, ConversationMessage};
use crate::config::{EngineConfig, LocalLoopConfig, TraceLimits};
use crate::protocol::{NUDGE, build_task_prompt, find_done, format_tool_results, parse_tool_calls};
use crate::redact::RedactionFilter;
use crate::task::{
    ExecutionContext, FileTracker, MessagePriority, Task, TaskResult, file_message,
};
use crate::tool::{Registry, ToolResult};
use crate::trace::{LoopStatus, TraceRecorder};

/// Error reported when a task is cancelled.
pub const CANCELLED: &str = "Cancelled by user";

/// Sub-agent that runs the agentic loop itself over a text-only backend.
pub struct LocalLoopAgent {
    backend: Arc<dyn CompletionBackend>,
    config: LocalLoopConfig,
    limits: TraceLimits,
    redactor: Arc<RedactionFilter>,
    cancel: CancelFlag,
}

impl LocalLoopAgent {
    pub fn new(backend: Arc<dyn CompletionBackend>) -> Self {
        Self {
            backend,
            config: LocalLoopConfig::default(),
            limits: TraceLimits::default(),
            redactor: Arc::new(RedactionFilter::new()),
            cancel: CancelFlag::new(),
        }
    }

    /// Apply loop and trace settings from an engine config.
    pub fn with_engine_config(mut self, config: &EngineConfig) -> Self {
        self.config = config.local.clone();
        self.limits = config.trace;
        self
    }

    pub fn config(mut self, config: LocalLoopConfig) -> Self {
        self.config = config;
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

#[async_trait]
impl SubAgent for LocalLoopAgent {
    fn provider(&self) -> Provider {
        Provider::Local
    }

    async fn execute(&self, task: &Task, ctx: ExecutionContext) -> TaskResult {
        self.cancel.reset();

        let config = self.config.clamped();
        let limits = self.limits.clamped();
        let max_iterations = config.max_iterations;
        let recorder = TraceRecorder::new(&task.id, &ctx, self.redactor.clone(), limits);
        let mut files = FileTracker::new();

        let mut transcript = vec![ConversationMessage::user(build_task_prompt(
            task,
            &ctx.working_directory,
            &ctx.tools.definitions(),
        ))];

        tracing::info!(task_id = %task.id, max_iterations, "starting local loop");
        recorder.status(0, LoopStatus::Started, Some(&task.name));
        recorder.message(&format!("Starting task: {}", task.name), MessagePriority::Info);

        let mut iteration = 0;
        let mut idle_turns = 0;
        let mut paused = false;

        loop {
            if self.is_cancelled(&ctx) {
                recorder.status(iteration, LoopStatus::Cancelled, None);
                recorder.message("Task cancelled", MessagePriority::Warning);
                return TaskResult::failed(CANCELLED).with_files(&files);
            }

            if iteration >= max_iterations {
                break;
            }

            if ctx.paused() {
                if !paused {
                    paused = true;
                    recorder.status(iteration, LoopStatus::Paused, None);
                    recorder.message("Task paused", MessagePriority::Info);
                }
                tokio::time::sleep(config.poll_interval()).await;
                continue;
            }
            if paused {
                paused = false;
                recorder.status(iteration, LoopStatus::Resumed, None);
                recorder.message("Task resumed", MessagePriority::Info);
            }

            iteration += 1;
            ctx.report_progress(((iteration * 100) / max_iterations).min(99) as u8);

            let prompt = transcript
                .last()
                .map(|m| m.content.clone())
                .unwrap_or_default();

            let response = match self.backend.complete(&transcript).await {
                Ok(text) => text,
                Err(e) => {
                    let error = e.to_string();
                    tracing::warn!(
                        task_id = %task.id,
                        iteration,
                        error = %self.redactor.redact(&error),
                        "backend call failed"
                    );
                    recorder.status(iteration, LoopStatus::Error, Some(&error));
                    recorder.message(&format!("Backend error: {}", error), MessagePriority::Error);
                    return TaskResult::failed(error).with_files(&files);
                }
            };
            recorder.llm(iteration, &prompt, &response);

            if let Some(summary) = find_done(&response) {
                recorder.status(iteration, LoopStatus::Done, Some(&summary));
                recorder.message(&format!("Task completed: {}", summary), MessagePriority::Info);
                ctx.report_progress(100);
                return TaskResult::succeeded(summary).with_files(&files);
            }

            let calls = parse_tool_calls(&response);
            transcript.push(ConversationMessage::assistant(response));

            if calls.is_empty() {
                idle_turns += 1;
                if config.max_idle_turns.is_some_and(|limit| idle_turns >= limit) {
                    let error = format!(
                        "Stalled: {} consecutive turns without tool calls",
                        idle_turns
                    );
                    recorder.status(iteration, LoopStatus::Stalled, Some(&error));
                    recorder.message(&error, MessagePriority::Error);
                    return TaskResult::failed(error).with_files(&files);
                }
                recorder.note(iteration, "No tool calls in response; nudging");
                transcript.push(ConversationMessage::user(NUDGE));
                continue;
            }
            idle_turns = 0;

            // Calls share one sandbox, so they run strictly in order.
            let mut results = Vec::with_capacity(calls.len());
            for call in calls {
                recorder.tool_call(iteration, &call);
                tracing::debug!(task_id = %task.id, iteration, tool = %call.name, "executing tool");

                let result = run_tool(&ctx.tools, &call.name, &call.args).await;
                recorder.tool_result(iteration, &call.name, &result);

                if let Some((path, kind)) = files.record_tool_result(&call.name, &result) {
                    recorder.message(
                        &file_message(&ctx.working_directory, &path, kind),
                        MessagePriority::Info,
                    );
                }
                results.push((call, result));
            }

            transcript.push(ConversationMessage::user(format_tool_results(
                &results,
                limits.tool_output_chars,
            )));
        }

        let summary = format!("Completed after {} iterations", max_iterations);
        recorder.status(iteration, LoopStatus::MaxIterations, Some(&summary));
        recorder.message(&summary, MessagePriority::Warning);
        ctx.report_progress(100);
        TaskResult::succeeded(summary).with_files(&files)
    }

    fn cancel(&self) {
        self.cancel.cancel();
    }
}

/// Look up and run one tool. Unknown names are failures, not errors.
pub(crate) async fn run_tool(
    tools: &Registry,
    name: &str,
    args: &crate::tool::ToolArgs,
) -> ToolResult {
    match tools.get(name) {
        Some(tool) => tool.execute(args).await,
        None => ToolResult::error(format!(
            "Unknown tool: {}. Available tools: {}",
            name,
            tools.names().join(", ")
        )),
    }
}
