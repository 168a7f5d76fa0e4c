// ABOUTME: ClaudeSdkAgent - runs a task through the Claude Agent SDK with the
// ABOUTME: sandboxed tools registered in-process, mapping its stream onto callbacks.

use std::sync::Arc;

use async_trait::async_trait;
use futures::{FutureExt, StreamExt};
use serde_json::Value;

use super::bridge::{ToolBridge, args_from_json};
use super::claude::{
    ClaudeAgentSdk, ClaudeContentBlock, ClaudeMessage, ClaudeQuery, ClaudeTextBlock, ClaudeTool,
    ClaudeToolOutput, ClaudeToolServer,
};
use super::{SdkProgress, cancelled_run, fail_run, finish_run, sdk_task_prompt, unavailable_run};
use crate::agent::{CancelFlag, Provider, SubAgent};
use crate::config::TraceLimits;
use crate::redact::RedactionFilter;
use crate::task::{ExecutionContext, MessagePriority, Task, TaskResult};
use crate::tool::ToolResult;
use crate::trace::{LoopStatus, TraceRecorder};

const SDK_NAME: &str = "Claude Agent SDK";
const DEFAULT_SERVER: &str = "handoff";

/// Sub-agent backed by the Claude Agent SDK.
pub struct ClaudeSdkAgent {
    sdk: Option<Arc<dyn ClaudeAgentSdk>>,
    server_name: String,
    system_prompt: Option<String>,
    max_turns: Option<usize>,
    limits: TraceLimits,
    redactor: Arc<RedactionFilter>,
    cancel: CancelFlag,
}

impl ClaudeSdkAgent {
    /// `None` models an SDK that could not be loaded; every task then fails
    /// with a diagnostic.
    pub fn new(sdk: Option<Arc<dyn ClaudeAgentSdk>>) -> Self {
        Self {
            sdk,
            server_name: DEFAULT_SERVER.to_string(),
            system_prompt: None,
            max_turns: None,
            limits: TraceLimits::default(),
            redactor: Arc::new(RedactionFilter::new()),
            cancel: CancelFlag::new(),
        }
    }

    pub fn server_name(mut self, name: impl Into<String>) -> Self {
        self.server_name = name.into();
        self
    }

    /// Extra system prompt passed to every query.
    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn max_turns(mut self, turns: usize) -> Self {
        self.max_turns = Some(turns);
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

/// Register every bridged tool on an in-process server.
pub fn claude_tool_server(name: &str, bridge: &ToolBridge) -> ClaudeToolServer {
    let mut server = ClaudeToolServer::new(name);
    for definition in bridge.tools().definitions() {
        let bridge = bridge.clone();
        let tool_name = definition.name.clone();
        server.tools.push(ClaudeTool {
            name: definition.name.clone(),
            description: definition.description.clone(),
            input_schema: definition.input_schema(),
            handler: Arc::new(move |input: Value| {
                let bridge = bridge.clone();
                let tool_name = tool_name.clone();
                async move {
                    let result = match args_from_json(&input) {
                        Ok(args) => bridge.invoke(&tool_name, args).await,
                        Err(e) => ToolResult::error(e),
                    };
                    ClaudeToolOutput {
                        content: vec![ClaudeTextBlock::new(result.output)],
                        is_error: !result.success,
                    }
                }
                .boxed()
            }),
        });
    }
    server
}

#[async_trait]
impl SubAgent for ClaudeSdkAgent {
    fn provider(&self) -> Provider {
        Provider::Claude
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

        let server = claude_tool_server(&self.server_name, &bridge);
        let query = ClaudeQuery {
            prompt: sdk_task_prompt(task, &ctx.working_directory),
            cwd: ctx.working_directory.clone(),
            system_prompt: self.system_prompt.clone(),
            allowed_tools: server.qualified_names(),
            tool_server: server,
            max_turns: self.max_turns,
            include_partial_messages: true,
        };

        tracing::info!(task_id = %task.id, sdk = SDK_NAME, "starting SDK run");
        recorder.status(0, LoopStatus::Started, Some(&task.name));
        let mut progress = SdkProgress::start(&ctx);

        let mut stream = match sdk.query(query).await {
            Ok(stream) => stream,
            Err(e) => return fail_run(&bridge, e.to_string()).await,
        };

        let mut last_text: Option<String> = None;
        while let Some(item) = stream.next().await {
            if self.is_cancelled(&ctx) {
                return cancelled_run(&bridge).await;
            }

            let message = match item {
                Ok(message) => message,
                Err(e) => return fail_run(&bridge, e.to_string()).await,
            };
            if let Some(delta) = message.text_delta() {
                recorder.message(delta, MessagePriority::Info);
                continue;
            }

            match message {
                ClaudeMessage::System { subtype, .. } => {
                    recorder.note(bridge.step(), &format!("system: {}", subtype));
                }
                ClaudeMessage::Assistant { message } => {
                    let step = bridge.advance();
                    for block in message.content {
                        match block {
                            ClaudeContentBlock::Text { text } => {
                                recorder.note(step, &text);
                                last_text = Some(text);
                            }
                            ClaudeContentBlock::Thinking { thinking } => {
                                recorder.note(step, &thinking);
                            }
                            ClaudeContentBlock::ToolUse { .. } | ClaudeContentBlock::Other => {}
                        }
                    }
                    progress.item_completed();
                }
                ClaudeMessage::Result {
                    subtype,
                    is_error,
                    result,
                    errors,
                    ..
                } => {
                    if is_error || subtype != "success" {
                        let error = if errors.is_empty() {
                            result.unwrap_or_else(|| format!("{} run failed: {}", SDK_NAME, subtype))
                        } else {
                            errors.join("; ")
                        };
                        return fail_run(&bridge, error).await;
                    }
                    let summary = result
                        .filter(|r| !r.trim().is_empty())
                        .or(last_text)
                        .unwrap_or_else(|| "Task completed".to_string());
                    return finish_run(&bridge, &mut progress, summary).await;
                }
                ClaudeMessage::StreamEvent { .. }
                | ClaudeMessage::User { .. }
                | ClaudeMessage::Unknown => {}
            }
        }

        fail_run(
            &bridge,
            format!("{} stream ended without a result", SDK_NAME),
        )
        .await
    }

    fn cancel(&self) {
        self.cancel.cancel();
    }
}
