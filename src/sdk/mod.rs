// ABOUTME: Adapters that run tasks through third-party agent SDKs while keeping
// ABOUTME: the SubAgent contract: bridged tools, event mapping, failure handling.

mod bridge;
mod claude;
mod claude_agent;
mod codex;
mod codex_agent;

pub use bridge::{ToolBridge, args_from_json};
pub use claude::{
    ClaudeAgentSdk, ClaudeAssistantMessage, ClaudeContentBlock, ClaudeMessage,
    ClaudeMessageStream, ClaudeQuery, ClaudeTextBlock, ClaudeTool, ClaudeToolHandler,
    ClaudeToolOutput, ClaudeToolServer,
};
pub use claude_agent::{ClaudeSdkAgent, claude_tool_server};
pub use codex::{
    CodexFunctionTool, CodexRun, CodexSdk, CodexToolHandler, CodexToolOutput, CodexUsage,
    FileUpdateChange, PatchChangeKind, ThreadError, ThreadEvent, ThreadEventStream, ThreadItem,
    ThreadItemDetails,
};
pub use codex_agent::{CodexSdkAgent, codex_function_tools, strict_parameters_schema};

use std::path::Path;

use crate::agent::CANCELLED;
use crate::error::SdkError;
use crate::task::{ExecutionContext, MessagePriority, Task, TaskResult};
use crate::trace::{LoopStatus, TraceRecorder};

/// Prompt for SDK runs. The SDK supplies its own tool-calling, so only the
/// task and the working directory are described.
pub fn sdk_task_prompt(task: &Task, working_directory: &Path) -> String {
    format!(
        "# Task: {}\n\n{}\n\nWorking directory: {}\n\nUse only the provided tools. \
         All file paths are relative to the working directory. \
         When you are finished, reply with a short summary of what you changed.",
        task.name,
        task.description.trim(),
        working_directory.display()
    )
}

/// Progress reporting for SDK runs: 5 at start, +5 per completed item up to
/// 95, 100 on success.
pub(crate) struct SdkProgress<'a> {
    ctx: &'a ExecutionContext,
    current: u8,
}

impl<'a> SdkProgress<'a> {
    pub(crate) fn start(ctx: &'a ExecutionContext) -> Self {
        ctx.report_progress(5);
        Self { ctx, current: 5 }
    }

    pub(crate) fn item_completed(&mut self) {
        let next = (self.current + 5).min(95);
        if next != self.current {
            self.current = next;
            self.ctx.report_progress(next);
        }
    }

    pub(crate) fn finish(&mut self) {
        self.current = 100;
        self.ctx.report_progress(100);
    }
}

/// The adapter has no SDK handle; fail without touching any tool.
pub(crate) fn unavailable_run(recorder: &TraceRecorder, sdk: &str) -> TaskResult {
    let error = SdkError::Unavailable {
        sdk: sdk.to_string(),
        reason: "no SDK handle was provided".to_string(),
    }
    .to_string();
    tracing::warn!(sdk, "SDK unavailable");
    recorder.status(0, LoopStatus::Error, Some(&error));
    recorder.message(&error, MessagePriority::Error);
    TaskResult::failed(error)
}

pub(crate) async fn cancelled_run(bridge: &ToolBridge) -> TaskResult {
    bridge.stop();
    let recorder = bridge.recorder();
    recorder.status(bridge.step(), LoopStatus::Cancelled, None);
    recorder.message("Task cancelled", MessagePriority::Warning);
    TaskResult::failed(CANCELLED).with_files(&bridge.files().await)
}

pub(crate) async fn fail_run(bridge: &ToolBridge, error: String) -> TaskResult {
    bridge.stop();
    let recorder = bridge.recorder();
    tracing::warn!(error = %recorder.scrub(&error, 500), "SDK run failed");
    recorder.status(bridge.step(), LoopStatus::Error, Some(&error));
    recorder.message(&error, MessagePriority::Error);
    TaskResult::failed(error).with_files(&bridge.files().await)
}

pub(crate) async fn finish_run(
    bridge: &ToolBridge,
    progress: &mut SdkProgress<'_>,
    summary: String,
) -> TaskResult {
    let recorder = bridge.recorder();
    recorder.status(bridge.step(), LoopStatus::Done, Some(&summary));
    recorder.message(&format!("Task completed: {}", summary), MessagePriority::Info);
    progress.finish();
    TaskResult::succeeded(summary).with_files(&bridge.files().await)
}

#[cfg(test)]
mod claude_agent_test;
