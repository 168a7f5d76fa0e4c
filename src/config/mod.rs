// ABOUTME: Engine configuration - local loop knobs and trace truncation limits.
// ABOUTME: Loadable from TOML; every integer knob is floor-clamped to at least 1.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level configuration, as found in a `handoff.toml`:
///
/// ```toml
/// [local]
/// max_iterations = 40
/// max_idle_turns = 3
///
/// [trace]
/// response_chars = 8000
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub local: LocalLoopConfig,
    pub trace: TraceLimits,
}

impl EngineConfig {
    /// Parse configuration from a TOML string. Missing keys take defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Self::parse(source, Path::new("<inline>"))
    }

    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        let config = Self::parse(&source, path)?;
        tracing::info!(path = %path.display(), "loaded engine config");
        Ok(config)
    }

    fn parse(source: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(source).map_err(|e| ConfigError::Parse {
            path: PathBuf::from(path),
            message: e.message().to_string(),
        })
    }

    /// Copy with every knob floored to its minimum.
    pub fn clamped(&self) -> Self {
        Self {
            local: self.local.clamped(),
            trace: self.trace.clamped(),
        }
    }
}

/// Knobs for the local text-protocol loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalLoopConfig {
    /// Backend calls allowed before the loop ends with a soft success.
    pub max_iterations: usize,

    /// Sleep between pause checks, in milliseconds.
    pub pause_poll_interval_ms: u64,

    /// Consecutive turns without tool calls that end the task as stalled.
    /// `None` keeps nudging until `max_iterations`.
    pub max_idle_turns: Option<usize>,
}

impl Default for LocalLoopConfig {
    fn default() -> Self {
        Self {
            max_iterations: 25,
            pause_poll_interval_ms: 300,
            max_idle_turns: None,
        }
    }
}

impl LocalLoopConfig {
    /// Set maximum iterations.
    pub fn max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    /// Set the pause poll interval.
    pub fn pause_poll_interval(mut self, interval: Duration) -> Self {
        self.pause_poll_interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Enable stall detection after `turns` idle turns.
    pub fn max_idle_turns(mut self, turns: usize) -> Self {
        self.max_idle_turns = Some(turns);
        self
    }

    /// The pause poll interval as a Duration.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.pause_poll_interval_ms)
    }

    pub fn clamped(&self) -> Self {
        Self {
            max_iterations: self.max_iterations.max(1),
            pause_poll_interval_ms: self.pause_poll_interval_ms.max(1),
            max_idle_turns: self.max_idle_turns.map(|n| n.max(1)),
        }
    }
}

/// Character caps applied to trace text after redaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceLimits {
    pub response_chars: usize,
    pub prompt_chars: usize,
    pub tool_output_chars: usize,
    pub preview_chars: usize,
}

impl Default for TraceLimits {
    fn default() -> Self {
        Self {
            response_chars: 4000,
            prompt_chars: 2000,
            tool_output_chars: 2000,
            preview_chars: 160,
        }
    }
}

impl TraceLimits {
    pub fn clamped(&self) -> Self {
        Self {
            response_chars: self.response_chars.max(1),
            prompt_chars: self.prompt_chars.max(1),
            tool_output_chars: self.tool_output_chars.max(1),
            preview_chars: self.preview_chars.max(1),
        }
    }
}
