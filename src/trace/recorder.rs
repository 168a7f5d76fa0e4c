// ABOUTME: TraceRecorder - per-execution reporter that redacts and truncates text,
// ABOUTME: numbers trace events, and forwards them and user messages to callbacks.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;

use super::{LoopStatus, TraceEvent, TraceKind};
use crate::config::TraceLimits;
use crate::protocol::ToolCall;
use crate::redact::{RedactionFilter, preview, truncate};
use crate::task::{ExecutionContext, MessageCallback, MessagePriority, TraceCallback};
use crate::tool::ToolResult;

/// Emits trace events and messages for one `execute()` call.
///
/// Shared behind an `Arc` by SDK adapters, whose tool handlers run on the
/// SDK's side; all methods take `&self`.
pub struct TraceRecorder {
    task_id: String,
    sink: Option<TraceCallback>,
    messages: Option<MessageCallback>,
    redactor: Arc<RedactionFilter>,
    limits: TraceLimits,
    seq: AtomicU64,
}

impl TraceRecorder {
    pub fn new(
        task_id: impl Into<String>,
        ctx: &ExecutionContext,
        redactor: Arc<RedactionFilter>,
        limits: TraceLimits,
    ) -> Self {
        Self {
            task_id: task_id.into(),
            sink: ctx.trace_sink(),
            messages: ctx.message_sink(),
            redactor,
            limits: limits.clamped(),
            seq: AtomicU64::new(0),
        }
    }

    /// Last sequence number issued (0 before the first event).
    pub fn last_seq(&self) -> u64 {
        self.seq.load(Ordering::SeqCst)
    }

    /// Redact and truncate to `max_chars`.
    pub fn scrub(&self, text: &str, max_chars: usize) -> String {
        truncate(&self.redactor.redact(text), max_chars)
    }

    /// Redact a message and deliver it to the orchestrator.
    pub fn message(&self, text: &str, priority: MessagePriority) {
        if let Some(f) = &self.messages {
            f(&self.redactor.redact(text), priority);
        }
    }

    pub fn llm(&self, iteration: usize, prompt: &str, response: &str) {
        let redacted = self.redactor.redact(response);
        let kind = TraceKind::Llm {
            prompt: self.scrub(prompt, self.limits.prompt_chars),
            response: truncate(&redacted, self.limits.response_chars),
            response_preview: preview(&redacted, self.limits.preview_chars),
        };
        self.emit(iteration, kind);
    }

    pub fn tool_call(&self, iteration: usize, call: &ToolCall) {
        let args: BTreeMap<String, String> = call
            .args
            .iter()
            .map(|(k, v)| (k.clone(), self.scrub(v, self.limits.tool_output_chars)))
            .collect();
        self.emit(
            iteration,
            TraceKind::ToolCall {
                tool: call.name.clone(),
                args,
            },
        );
    }

    pub fn tool_result(&self, iteration: usize, tool: &str, result: &ToolResult) {
        let redacted = self.redactor.redact(&result.output);
        self.emit(
            iteration,
            TraceKind::ToolResult {
                tool: tool.to_string(),
                success: result.success,
                output: truncate(&redacted, self.limits.tool_output_chars),
                output_preview: preview(&redacted, self.limits.preview_chars),
            },
        );
    }

    pub fn status(&self, iteration: usize, status: LoopStatus, detail: Option<&str>) {
        let detail = detail.map(|d| self.scrub(d, self.limits.response_chars));
        tracing::info!(
            task_id = %self.task_id,
            iteration,
            status = ?status,
            detail = detail.as_deref().unwrap_or(""),
            "task status"
        );
        self.emit(iteration, TraceKind::Status { status, detail });
    }

    pub fn note(&self, iteration: usize, message: &str) {
        let message = self.scrub(message, self.limits.response_chars);
        self.emit(iteration, TraceKind::Note { message });
    }

    fn emit(&self, iteration: usize, kind: TraceKind) {
        let seq = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
        let event = TraceEvent {
            seq,
            iteration,
            ts: Utc::now(),
            kind,
        };
        tracing::debug!(task_id = %self.task_id, seq, iteration, event = ?event.kind, "trace");
        if let Some(sink) = &self.sink {
            sink(&event);
        }
    }
}
