// ABOUTME: Prelude module - convenient imports for common use cases.
// ABOUTME: Use `use handoff::prelude::*;` to get started quickly.

pub use crate::agent::{AgentBuilder, AnySubAgent, CancelFlag, LocalLoopAgent, Provider, SubAgent};
pub use crate::backend::{CompletionBackend, ConversationMessage, Role};
pub use crate::config::{EngineConfig, LocalLoopConfig, TraceLimits};
pub use crate::error::{BackendError, ConfigError, HandoffError, SandboxError, SdkError};
pub use crate::redact::RedactionFilter;
pub use crate::sdk::{ClaudeAgentSdk, ClaudeSdkAgent, CodexSdk, CodexSdkAgent};
pub use crate::task::{
    ExecutionContext, FileChangeKind, MessagePriority, Task, TaskResult,
};
pub use crate::tool::{Registry, Tool, ToolArgs, ToolDefinition, ToolParameter, ToolResult};
pub use crate::tools::{CommandFilter, Sandbox, sandboxed_tools};
pub use crate::trace::{LoopStatus, TraceEvent, TraceKind};
