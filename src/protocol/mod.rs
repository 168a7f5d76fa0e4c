// ABOUTME: Text tool-calling protocol for completion backends without native
// ABOUTME: tool use: call-line parsing, DONE detection, and prompt rendering.

mod parser;
mod prompt;

pub use parser::{
    CONTENT_END, CONTENT_START, DONE_MARKER, TOOL_MARKER, ToolCall, find_done, parse_tool_calls,
};
pub use prompt::{NUDGE, build_task_prompt, format_tool_results, render_tool_catalog};
