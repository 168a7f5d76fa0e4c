// ABOUTME: Character-safe truncation and one-line previews for trace text.
// ABOUTME: Both operate on chars, never splitting a UTF-8 sequence.

/// Appended to truncated text.
pub const ELLIPSIS: char = '…';

/// Keep at most `max_chars` characters, appending an ellipsis when cut.
pub fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        None => text.to_string(),
        Some((byte_idx, _)) => {
            let mut out = text[..byte_idx].to_string();
            out.push(ELLIPSIS);
            out
        }
    }
}

/// First non-empty line with whitespace runs collapsed, truncated for display.
pub fn preview(text: &str, max_chars: usize) -> String {
    let line = text
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or_default();
    let collapsed = line.split_whitespace().collect::<Vec<_>>().join(" ");
    truncate(&collapsed, max_chars)
}
