// ABOUTME: Trace events for debugging sub-agent runs and the recorder that
// ABOUTME: emits them with redaction, truncation, and per-call sequencing.

mod event;
mod recorder;

pub use event::{LoopStatus, TraceEvent, TraceKind};
pub use recorder::TraceRecorder;
