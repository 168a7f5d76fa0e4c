// ABOUTME: Codex SDK surface - run options, function tools, and the thread event
// ABOUTME: stream (thread/turn/item events) the adapter consumes.

use std::fmt;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use futures::Stream;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SdkError;

/// Stream of events produced by one streamed run.
pub type ThreadEventStream = Pin<Box<dyn Stream<Item = Result<ThreadEvent, SdkError>> + Send>>;

/// Handler for a function tool. Receives the raw JSON arguments string.
pub type CodexToolHandler = Arc<dyn Fn(String) -> BoxFuture<'static, CodexToolOutput> + Send + Sync>;

/// The Codex SDK, seen from the engine.
#[async_trait]
pub trait CodexSdk: Send + Sync {
    /// Start a thread in `run.working_directory` and stream its events.
    async fn run_streamed(&self, run: CodexRun) -> Result<ThreadEventStream, SdkError>;
}

/// Options for one streamed run.
#[derive(Debug, Clone)]
pub struct CodexRun {
    pub prompt: String,
    pub working_directory: PathBuf,
    pub tools: Vec<CodexFunctionTool>,
    pub skip_git_repo_check: bool,
}

impl CodexRun {
    pub fn tool(&self, name: &str) -> Option<&CodexFunctionTool> {
        self.tools.iter().find(|t| t.name == name)
    }

    /// Invoke a tool as the SDK would, with a JSON arguments string.
    pub async fn call(&self, name: &str, arguments: &str) -> Option<CodexToolOutput> {
        let tool = self.tool(name)?;
        Some((tool.handler)(arguments.to_string()).await)
    }
}

/// A function tool registered with a run.
#[derive(Clone)]
pub struct CodexFunctionTool {
    pub name: String,
    pub description: String,
    pub parameters: Value,
    pub strict: bool,
    pub handler: CodexToolHandler,
}

impl fmt::Debug for CodexFunctionTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodexFunctionTool")
            .field("name", &self.name)
            .field("strict", &self.strict)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodexToolOutput {
    pub output: String,
    pub success: bool,
}

/// One event of a streamed run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ThreadEvent {
    #[serde(rename = "thread.started")]
    ThreadStarted { thread_id: String },
    #[serde(rename = "turn.started")]
    TurnStarted,
    #[serde(rename = "item.started")]
    ItemStarted { item: ThreadItem },
    #[serde(rename = "item.updated")]
    ItemUpdated { item: ThreadItem },
    #[serde(rename = "item.completed")]
    ItemCompleted { item: ThreadItem },
    #[serde(rename = "turn.completed")]
    TurnCompleted {
        #[serde(default)]
        usage: Option<CodexUsage>,
    },
    #[serde(rename = "turn.failed")]
    TurnFailed { error: ThreadError },
    #[serde(rename = "error")]
    Error { message: String },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodexUsage {
    #[serde(default)]
    pub input_tokens: u64,
    #[serde(default)]
    pub cached_input_tokens: u64,
    #[serde(default)]
    pub output_tokens: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadError {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadItem {
    pub id: String,
    #[serde(flatten)]
    pub details: ThreadItemDetails,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ThreadItemDetails {
    AgentMessage {
        text: String,
    },
    Reasoning {
        text: String,
    },
    CommandExecution {
        command: String,
        #[serde(default)]
        aggregated_output: String,
        #[serde(default)]
        exit_code: Option<i32>,
        #[serde(default)]
        status: String,
    },
    FileChange {
        changes: Vec<FileUpdateChange>,
        #[serde(default)]
        status: String,
    },
    McpToolCall {
        server: String,
        tool: String,
        #[serde(default)]
        status: String,
    },
    Error {
        message: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileUpdateChange {
    pub path: String,
    pub kind: PatchChangeKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchChangeKind {
    Add,
    Delete,
    Update,
}
