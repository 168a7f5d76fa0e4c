// ABOUTME: Parses TOOL: call lines and their content payloads out of free-form
// ABOUTME: backend text. Pure functions over strings; malformed calls are skipped.

use serde::Serialize;

use crate::tool::ToolArgs;

/// Marker that opens a call line.
pub const TOOL_MARKER: &str = "TOOL:";
/// Marker that ends the task.
pub const DONE_MARKER: &str = "DONE:";
/// Opens an explicit content payload.
pub const CONTENT_START: &str = "CONTENT_START";
/// Closes an explicit content payload.
pub const CONTENT_END: &str = "CONTENT_END";

const FENCE: &str = "```";

/// One parsed tool invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolCall {
    pub name: String,
    pub args: ToolArgs,
}

impl ToolCall {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: ToolArgs::new(),
        }
    }

    /// Builder-style argument.
    pub fn arg(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.args.insert(key.into(), value.into());
        self
    }
}

/// Parse every well-formed tool call in `text`, in document order.
///
/// A call may be followed by a `CONTENT_START`/`CONTENT_END` block or a fenced
/// code block, which becomes its `content` argument unless the call already
/// passed `content` explicitly. Text consumed as content is not scanned for
/// further calls.
pub fn parse_tool_calls(text: &str) -> Vec<ToolCall> {
    let mut calls = Vec::new();
    let mut pos = 0;

    while let Some(found) = text[pos..].find(TOOL_MARKER) {
        let start = pos + found;
        let after_marker = start + TOOL_MARKER.len();

        let Some((mut call, call_end)) = parse_call(text, after_marker) else {
            pos = after_marker;
            continue;
        };

        pos = call_end;
        if !call.args.contains_key("content") {
            if let Some((content, consumed_to)) = extract_content(text, call_end) {
                call.args.insert("content".to_string(), content);
                pos = consumed_to;
            }
        }
        calls.push(call);
    }

    calls
}

/// Find the first `DONE:` marker and return the rest of its line as the summary.
pub fn find_done(text: &str) -> Option<String> {
    let start = text.find(DONE_MARKER)? + DONE_MARKER.len();
    let rest = &text[start..];
    let summary = rest.lines().next().unwrap_or("").trim();
    Some(if summary.is_empty() {
        "Task completed".to_string()
    } else {
        summary.to_string()
    })
}

/// Parse `NAME(ARGS)` starting right after the marker. Returns the call and the
/// byte offset just past the closing parenthesis.
fn parse_call(text: &str, start: usize) -> Option<(ToolCall, usize)> {
    let mut cursor = Cursor::new(text, start);

    cursor.skip_inline_space();
    let name = cursor.ident()?;
    cursor.skip_inline_space();
    cursor.expect('(')?;

    let mut call = ToolCall::new(name);
    loop {
        cursor.skip_space();
        if cursor.eat(')') {
            break;
        }
        let key = cursor.ident()?;
        cursor.skip_space();
        cursor.expect('=')?;
        cursor.skip_space();
        let value = cursor.value()?;
        call.args.insert(key, value);
        cursor.skip_space();
        if cursor.eat(',') {
            continue;
        }
        cursor.expect(')')?;
        break;
    }

    Some((call, cursor.pos))
}

/// Look for a content payload after a call ending at `from`.
fn extract_content(text: &str, from: usize) -> Option<(String, usize)> {
    let rest = &text[from..];

    let trimmed = rest.trim_start();
    if let Some(body) = trimmed.strip_prefix(CONTENT_START) {
        let body_start = from + (rest.len() - trimmed.len()) + CONTENT_START.len();
        if let Some(end) = body.find(CONTENT_END) {
            let content = body[..end].trim().to_string();
            return Some((content, body_start + end + CONTENT_END.len()));
        }
    }

    // A fence only belongs to this call if it opens before the next call.
    let region_end = rest.find(TOOL_MARKER).unwrap_or(rest.len());
    let open = rest[..region_end].find(FENCE)?;
    let after_open = open + FENCE.len();
    // Skip the language tag line.
    let body_start = after_open + rest[after_open..].find('\n')? + 1;
    let close = find_closing_fence(&rest[body_start..])?;

    let mut content = &rest[body_start..body_start + close];
    content = content.strip_suffix('\n').unwrap_or(content);
    content = content.strip_suffix('\r').unwrap_or(content);

    Some((content.to_string(), from + body_start + close + FENCE.len()))
}

/// Offset of a fence that starts a line in `body`.
fn find_closing_fence(body: &str) -> Option<usize> {
    if body.starts_with(FENCE) {
        return Some(0);
    }
    let mut offset = 0;
    while let Some(nl) = body[offset..].find('\n') {
        let line_start = offset + nl + 1;
        let line = &body[line_start..];
        let indent = line.len() - line.trim_start_matches([' ', '\t']).len();
        if line[indent..].starts_with(FENCE) {
            return Some(line_start);
        }
        offset = line_start;
    }
    None
}

/// Byte cursor over the source text.
struct Cursor<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(src: &'a str, pos: usize) -> Self {
        Self { src, pos }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: char) -> Option<()> {
        self.eat(expected).then_some(())
    }

    fn skip_inline_space(&mut self) {
        while matches!(self.peek(), Some(' ' | '\t')) {
            self.pos += 1;
        }
    }

    fn skip_space(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn ident(&mut self) -> Option<String> {
        let start = self.pos;
        match self.peek() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {
                self.pos += 1;
            }
            _ => return None,
        }
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            self.pos += 1;
        }
        Some(self.src[start..self.pos].to_string())
    }

    fn value(&mut self) -> Option<String> {
        if self.eat('"') {
            return self.quoted();
        }
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c != ',' && c != ')' && !c.is_whitespace())
        {
            self.bump();
        }
        (self.pos > start).then(|| self.src[start..self.pos].to_string())
    }

    /// Body of a quoted value; the opening quote is already consumed.
    fn quoted(&mut self) -> Option<String> {
        let mut out = String::new();
        loop {
            match self.bump()? {
                '"' => return Some(out),
                '\\' => match self.bump()? {
                    '"' => out.push('"'),
                    '\\' => out.push('\\'),
                    'n' => out.push('\n'),
                    't' => out.push('\t'),
                    other => {
                        // Unknown escapes are kept as written (e.g. Windows paths).
                        out.push('\\');
                        out.push(other);
                    }
                },
                c => out.push(c),
            }
        }
    }
}
