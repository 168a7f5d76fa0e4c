// ABOUTME: Provider - the closed set of sub-agent backends, selected by a
// ABOUTME: case-insensitive provider id string.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Which implementation runs a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Text-protocol loop over a plain completion backend.
    Local,
    /// Claude Agent SDK adapter.
    Claude,
    /// Codex SDK adapter.
    Codex,
}

impl Provider {
    pub const ALL: [Provider; 3] = [Provider::Local, Provider::Claude, Provider::Codex];

    /// Canonical id.
    pub fn id(&self) -> &'static str {
        match self {
            Provider::Local => "local",
            Provider::Claude => "claude",
            Provider::Codex => "codex",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Provider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" | "loop" | "text" => Ok(Provider::Local),
            "claude" | "claude-agent-sdk" | "claude-code" => Ok(Provider::Claude),
            "codex" | "codex-sdk" => Ok(Provider::Codex),
            _ => Err(ConfigError::UnknownProvider(s.to_string())),
        }
    }
}
