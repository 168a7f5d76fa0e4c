// ABOUTME: Builds the text sent to a completion backend: the initial task prompt,
// ABOUTME: the tool-result turn, and the nudge used when a turn has no calls.

use std::fmt::Write as _;
use std::path::Path;

use super::{CONTENT_END, CONTENT_START, DONE_MARKER, TOOL_MARKER, ToolCall};
use crate::redact::truncate;
use crate::task::Task;
use crate::tool::{ToolDefinition, ToolResult};

/// Synthetic user turn appended after a response without tool calls.
pub const NUDGE: &str = "No tool calls were found in your last response. Continue working using \
TOOL: calls, or reply with DONE: <summary> when the task is complete.";

/// Render the first user turn of a task.
pub fn build_task_prompt(task: &Task, working_directory: &Path, tools: &[ToolDefinition]) -> String {
    let mut prompt = String::new();

    let _ = writeln!(prompt, "You are an autonomous coding agent working on one task.");
    let _ = writeln!(prompt);
    let _ = writeln!(prompt, "# Task: {}", task.name);
    let _ = writeln!(prompt);
    let _ = writeln!(prompt, "{}", task.description.trim());
    let _ = writeln!(prompt);
    let _ = writeln!(
        prompt,
        "Working directory: {} (all paths are relative to it)",
        working_directory.display()
    );
    let _ = writeln!(prompt);

    let _ = writeln!(prompt, "# Tools");
    let _ = writeln!(prompt);
    prompt.push_str(&render_tool_catalog(tools));
    let _ = writeln!(prompt);

    let _ = writeln!(prompt, "# How to call tools");
    let _ = writeln!(prompt);
    let _ = writeln!(
        prompt,
        "Call a tool by writing one line per call, in this exact form:"
    );
    let _ = writeln!(prompt);
    let _ = writeln!(prompt, "{} read_file(filepath=\"src/main.rs\")", TOOL_MARKER);
    let _ = writeln!(prompt);
    let _ = writeln!(
        prompt,
        "Argument values are double-quoted strings; escape quotes inside them as \\\". \
         For long file contents, put the content in a block right after the call line:"
    );
    let _ = writeln!(prompt);
    let _ = writeln!(prompt, "{} write_file(filepath=\"notes.md\")", TOOL_MARKER);
    let _ = writeln!(prompt, "{}", CONTENT_START);
    let _ = writeln!(prompt, "# Notes");
    let _ = writeln!(prompt, "{}", CONTENT_END);
    let _ = writeln!(prompt);
    let _ = writeln!(
        prompt,
        "You may make several calls in one response; they run in order and you will receive \
         their results in the next message."
    );
    let _ = writeln!(prompt);
    let _ = writeln!(prompt, "# Finishing");
    let _ = writeln!(prompt);
    let _ = write!(
        prompt,
        "When the task is complete, reply with a line starting with {} followed by a one-line \
         summary of what you did.",
        DONE_MARKER
    );

    prompt
}

/// Render tool names, descriptions and parameters, one block per tool.
pub fn render_tool_catalog(tools: &[ToolDefinition]) -> String {
    let mut out = String::new();
    for tool in tools {
        let _ = writeln!(out, "- {}: {}", tool.name, tool.description);
        for param in &tool.parameters {
            let marker = if param.required { "required" } else { "optional" };
            let _ = writeln!(out, "    {} ({}): {}", param.name, marker, param.description);
        }
    }
    out
}

/// Render the synthetic user turn that reports tool results back to the backend.
pub fn format_tool_results(results: &[(ToolCall, ToolResult)], max_output_chars: usize) -> String {
    let sections: Vec<String> = results
        .iter()
        .map(|(call, result)| {
            let status = if result.success { "OK" } else { "FAILED" };
            let output = if result.output.is_empty() {
                "(no output)".to_string()
            } else {
                truncate(&result.output, max_output_chars)
            };
            format!("[{}] {}\n{}", call.name, status, output)
        })
        .collect();

    format!("Tool results:\n\n{}", sections.join("\n\n"))
}
