// ABOUTME: Claude Agent SDK surface - query options, in-process tool server, and
// ABOUTME: the streamed message types the adapter reacts to.

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

/// Stream of messages produced by one query.
pub type ClaudeMessageStream = Pin<Box<dyn Stream<Item = Result<ClaudeMessage, SdkError>> + Send>>;

/// Handler invoked by the SDK when the model calls a registered tool.
pub type ClaudeToolHandler = Arc<dyn Fn(Value) -> BoxFuture<'static, ClaudeToolOutput> + Send + Sync>;

/// The Claude Agent SDK, seen from the engine.
#[async_trait]
pub trait ClaudeAgentSdk: Send + Sync {
    /// Start an agent run and stream its messages.
    async fn query(&self, query: ClaudeQuery) -> Result<ClaudeMessageStream, SdkError>;
}

/// Options for one agent run.
#[derive(Debug, Clone)]
pub struct ClaudeQuery {
    pub prompt: String,
    pub cwd: PathBuf,
    pub system_prompt: Option<String>,
    /// In-process tool server; its tools are the only ones allowed.
    pub tool_server: ClaudeToolServer,
    pub allowed_tools: Vec<String>,
    pub max_turns: Option<usize>,
    pub include_partial_messages: bool,
}

/// A named group of tools exposed to the model as `mcp__<server>__<tool>`.
#[derive(Clone)]
pub struct ClaudeToolServer {
    pub name: String,
    pub tools: Vec<ClaudeTool>,
}

impl ClaudeToolServer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tools: Vec::new(),
        }
    }

    /// Name under which the model sees `tool`.
    pub fn qualified_name(&self, tool: &str) -> String {
        format!("mcp__{}__{}", self.name, tool)
    }

    pub fn qualified_names(&self) -> Vec<String> {
        self.tools
            .iter()
            .map(|t| self.qualified_name(&t.name))
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<&ClaudeTool> {
        self.tools.iter().find(|t| t.name == name)
    }

    /// Invoke a tool by plain or qualified name, as the SDK would.
    pub async fn call(&self, name: &str, input: Value) -> Option<ClaudeToolOutput> {
        let prefix = format!("mcp__{}__", self.name);
        let plain = name.strip_prefix(&prefix).unwrap_or(name);
        let tool = self.get(plain)?;
        Some((tool.handler)(input).await)
    }
}

impl fmt::Debug for ClaudeToolServer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClaudeToolServer")
            .field("name", &self.name)
            .field("tools", &self.tools.iter().map(|t| &t.name).collect::<Vec<_>>())
            .finish()
    }
}

/// One tool registered with the SDK.
#[derive(Clone)]
pub struct ClaudeTool {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
    pub handler: ClaudeToolHandler,
}

/// What a tool handler returns to the SDK.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaudeToolOutput {
    pub content: Vec<ClaudeTextBlock>,
    #[serde(default, rename = "isError")]
    pub is_error: bool,
}

impl ClaudeToolOutput {
    pub fn text(&self) -> String {
        self.content
            .iter()
            .map(|b| b.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaudeTextBlock {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
}

impl ClaudeTextBlock {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            kind: "text".to_string(),
            text: text.into(),
        }
    }
}

/// One streamed SDK message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClaudeMessage {
    System {
        #[serde(default)]
        subtype: String,
        #[serde(default)]
        session_id: Option<String>,
    },
    /// Raw streaming event, present when partial messages are enabled.
    StreamEvent { event: Value },
    Assistant { message: ClaudeAssistantMessage },
    User {
        #[serde(default)]
        message: Value,
    },
    Result {
        subtype: String,
        #[serde(default)]
        is_error: bool,
        #[serde(default)]
        result: Option<String>,
        #[serde(default)]
        errors: Vec<String>,
        #[serde(default)]
        num_turns: u32,
    },
    #[serde(other)]
    Unknown,
}

impl ClaudeMessage {
    /// Text of a `content_block_delta` stream event.
    pub fn text_delta(&self) -> Option<&str> {
        let ClaudeMessage::StreamEvent { event } = self else {
            return None;
        };
        if event.get("type")?.as_str()? != "content_block_delta" {
            return None;
        }
        let delta = event.get("delta")?;
        if delta.get("type")?.as_str()? != "text_delta" {
            return None;
        }
        delta.get("text")?.as_str()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClaudeAssistantMessage {
    #[serde(default)]
    pub content: Vec<ClaudeContentBlock>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClaudeContentBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: Value,
    },
    Thinking {
        thinking: String,
    },
    #[serde(other)]
    Other,
}
