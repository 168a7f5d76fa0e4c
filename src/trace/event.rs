// ABOUTME: TraceEvent types - append-only observability records of loop steps,
// ABOUTME: serialized as tagged JSON objects (one per line when persisted).

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of one execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopStatus {
    Started,
    Paused,
    Resumed,
    Done,
    Cancelled,
    MaxIterations,
    Stalled,
    Error,
}

/// Payload of a trace event. Every text field is redacted and truncated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TraceKind {
    /// One backend exchange.
    Llm {
        prompt: String,
        response: String,
        response_preview: String,
    },
    ToolCall {
        tool: String,
        args: BTreeMap<String, String>,
    },
    ToolResult {
        tool: String,
        success: bool,
        output: String,
        output_preview: String,
    },
    Status {
        status: LoopStatus,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        detail: Option<String>,
    },
    Note {
        message: String,
    },
}

/// One trace record. `seq` is strictly increasing within one execute() call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceEvent {
    pub seq: u64,
    pub iteration: usize,
    pub ts: DateTime<Utc>,
    #[serde(flatten)]
    pub kind: TraceKind,
}

impl TraceEvent {
    /// Status carried by a `status` event.
    pub fn status(&self) -> Option<LoopStatus> {
        match &self.kind {
            TraceKind::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
