// ABOUTME: AnySubAgent - closed enum over every SubAgent implementation, and
// ABOUTME: AgentBuilder which constructs one from a provider id and dependencies.

use std::sync::Arc;

use async_trait::async_trait;

use super::{LocalLoopAgent, Provider, SubAgent};
use crate::backend::CompletionBackend;
use crate::config::EngineConfig;
use crate::error::ConfigError;
use crate::redact::RedactionFilter;
use crate::sdk::{ClaudeAgentSdk, ClaudeSdkAgent, CodexSdk, CodexSdkAgent};
use crate::task::{ExecutionContext, Task, TaskResult};

/// One of the supported sub-agents.
pub enum AnySubAgent {
    Local(LocalLoopAgent),
    Claude(ClaudeSdkAgent),
    Codex(CodexSdkAgent),
}

#[async_trait]
impl SubAgent for AnySubAgent {
    fn provider(&self) -> Provider {
        match self {
            AnySubAgent::Local(a) => a.provider(),
            AnySubAgent::Claude(a) => a.provider(),
            AnySubAgent::Codex(a) => a.provider(),
        }
    }

    async fn execute(&self, task: &Task, ctx: ExecutionContext) -> TaskResult {
        match self {
            AnySubAgent::Local(a) => a.execute(task, ctx).await,
            AnySubAgent::Claude(a) => a.execute(task, ctx).await,
            AnySubAgent::Codex(a) => a.execute(task, ctx).await,
        }
    }

    fn cancel(&self) {
        match self {
            AnySubAgent::Local(a) => a.cancel(),
            AnySubAgent::Claude(a) => a.cancel(),
            AnySubAgent::Codex(a) => a.cancel(),
        }
    }
}

/// Builds an [`AnySubAgent`] for a provider.
///
/// The local loop needs a completion backend. SDK adapters may be built
/// without an SDK handle; they then fail each task with a diagnostic.
pub struct AgentBuilder {
    provider: Provider,
    backend: Option<Arc<dyn CompletionBackend>>,
    claude: Option<Arc<dyn ClaudeAgentSdk>>,
    codex: Option<Arc<dyn CodexSdk>>,
    config: EngineConfig,
    redactor: RedactionFilter,
}

impl AgentBuilder {
    pub fn new(provider: Provider) -> Self {
        Self {
            provider,
            backend: None,
            claude: None,
            codex: None,
            config: EngineConfig::default(),
            redactor: RedactionFilter::new(),
        }
    }

    /// Start from a provider id such as `"local"` or `"codex-sdk"`.
    pub fn for_provider_id(id: &str) -> Result<Self, ConfigError> {
        Ok(Self::new(id.parse()?))
    }

    pub fn backend(mut self, backend: Arc<dyn CompletionBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn claude_sdk(mut self, sdk: Arc<dyn ClaudeAgentSdk>) -> Self {
        self.claude = Some(sdk);
        self
    }

    pub fn codex_sdk(mut self, sdk: Arc<dyn CodexSdk>) -> Self {
        self.codex = Some(sdk);
        self
    }

    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn redaction(mut self, redactor: RedactionFilter) -> Self {
        self.redactor = redactor;
        self
    }

    pub fn build(self) -> Result<AnySubAgent, ConfigError> {
        tracing::debug!(provider = %self.provider, "building sub-agent");
        match self.provider {
            Provider::Local => {
                let backend = self.backend.ok_or_else(|| ConfigError::MissingDependency {
                    provider: Provider::Local.to_string(),
                    what: "a completion backend".to_string(),
                })?;
                Ok(AnySubAgent::Local(
                    LocalLoopAgent::new(backend)
                        .with_engine_config(&self.config)
                        .redaction(self.redactor),
                ))
            }
            Provider::Claude => Ok(AnySubAgent::Claude(
                ClaudeSdkAgent::new(self.claude)
                    .trace_limits(self.config.trace)
                    .redaction(self.redactor),
            )),
            Provider::Codex => Ok(AnySubAgent::Codex(
                CodexSdkAgent::new(self.codex)
                    .trace_limits(self.config.trace)
                    .redaction(self.redactor),
            )),
        }
    }
}
