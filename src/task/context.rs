// ABOUTME: ExecutionContext - the capability bundle passed into one execute()
// ABOUTME: call. Callbacks are optional; absent ones are no-ops.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::MessagePriority;
use crate::error::SandboxError;
use crate::tool::Registry;
use crate::tools::sandboxed_tools;
use crate::trace::TraceEvent;

/// Receives progress in percent (0..=100).
pub type ProgressCallback = Arc<dyn Fn(u8) + Send + Sync>;

/// Receives user-facing messages. Text is already redacted.
pub type MessageCallback = Arc<dyn Fn(&str, MessagePriority) + Send + Sync>;

/// Receives trace events, in `seq` order.
pub type TraceCallback = Arc<dyn Fn(&TraceEvent) + Send + Sync>;

/// Polled flag such as "is this task cancelled?".
pub type Predicate = Arc<dyn Fn() -> bool + Send + Sync>;

/// Everything one `execute()` call may use. Polled, never pushed to.
#[derive(Clone)]
pub struct ExecutionContext {
    pub working_directory: PathBuf,
    pub tools: Registry,
    on_progress: Option<ProgressCallback>,
    on_message: Option<MessageCallback>,
    on_trace: Option<TraceCallback>,
    is_cancelled: Option<Predicate>,
    is_paused: Option<Predicate>,
}

impl ExecutionContext {
    /// Create a context with the given tools and no callbacks.
    pub fn new(working_directory: impl Into<PathBuf>, tools: Registry) -> Self {
        Self {
            working_directory: working_directory.into(),
            tools,
            on_progress: None,
            on_message: None,
            on_trace: None,
            is_cancelled: None,
            is_paused: None,
        }
    }

    /// Create a context with the standard sandboxed toolset bound to
    /// `working_directory`.
    pub fn sandboxed(working_directory: impl AsRef<Path>) -> Result<Self, SandboxError> {
        let tools = sandboxed_tools(working_directory.as_ref())?;
        let root = std::fs::canonicalize(working_directory.as_ref())?;
        Ok(Self::new(root, tools))
    }

    pub fn on_progress(mut self, f: impl Fn(u8) + Send + Sync + 'static) -> Self {
        self.on_progress = Some(Arc::new(f));
        self
    }

    pub fn on_message(mut self, f: impl Fn(&str, MessagePriority) + Send + Sync + 'static) -> Self {
        self.on_message = Some(Arc::new(f));
        self
    }

    pub fn on_trace(mut self, f: impl Fn(&TraceEvent) + Send + Sync + 'static) -> Self {
        self.on_trace = Some(Arc::new(f));
        self
    }

    pub fn is_cancelled(mut self, f: impl Fn() -> bool + Send + Sync + 'static) -> Self {
        self.is_cancelled = Some(Arc::new(f));
        self
    }

    /// Without a pause predicate the task is never paused.
    pub fn is_paused(mut self, f: impl Fn() -> bool + Send + Sync + 'static) -> Self {
        self.is_paused = Some(Arc::new(f));
        self
    }

    /// Report progress, clamped to 100.
    pub fn report_progress(&self, percent: u8) {
        if let Some(f) = &self.on_progress {
            f(percent.min(100));
        }
    }

    /// Forward a message as-is. Callers redact first.
    pub fn send_message(&self, text: &str, priority: MessagePriority) {
        if let Some(f) = &self.on_message {
            f(text, priority);
        }
    }

    pub fn cancelled(&self) -> bool {
        self.is_cancelled.as_ref().is_some_and(|f| f())
    }

    pub fn paused(&self) -> bool {
        self.is_paused.as_ref().is_some_and(|f| f())
    }

    pub(crate) fn trace_sink(&self) -> Option<TraceCallback> {
        self.on_trace.clone()
    }

    pub(crate) fn message_sink(&self) -> Option<MessageCallback> {
        self.on_message.clone()
    }
}

impl fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("working_directory", &self.working_directory)
            .field("tools", &self.tools)
            .field("on_trace", &self.on_trace.is_some())
            .field("is_paused", &self.is_paused.is_some())
            .finish_non_exhaustive()
    }
}
