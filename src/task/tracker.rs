// ABOUTME: FileTracker - ordered, deduplicated record of files a task created
// ABOUTME: or modified; the first tool to touch a path decides its class.

use std::fmt;
use std::path::Path;

use serde::Serialize;

use crate::tool::ToolResult;

/// How a file was changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileChangeKind {
    Created,
    Modified,
}

impl FileChangeKind {
    /// Classification for a tool that mutates files, if any.
    pub fn for_tool(tool_name: &str) -> Option<Self> {
        match tool_name {
            "write_file" => Some(Self::Created),
            "edit_file" => Some(Self::Modified),
            _ => None,
        }
    }
}

impl fmt::Display for FileChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Modified => write!(f, "modified"),
        }
    }
}

/// Files changed during one execution.
///
/// A path lands in exactly one list, decided by the first change recorded
/// for it; later changes to the same path are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileTracker {
    created: Vec<String>,
    modified: Vec<String>,
}

impl FileTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a change. Returns false if the path was already tracked.
    pub fn record(&mut self, path: impl Into<String>, kind: FileChangeKind) -> bool {
        let path = path.into();
        if self.contains(&path) {
            return false;
        }
        match kind {
            FileChangeKind::Created => self.created.push(path),
            FileChangeKind::Modified => self.modified.push(path),
        }
        true
    }

    /// Record the change made by a successful `write_file`/`edit_file` call.
    /// Returns the newly tracked path and its class.
    pub fn record_tool_result(
        &mut self,
        tool_name: &str,
        result: &ToolResult,
    ) -> Option<(String, FileChangeKind)> {
        if !result.success {
            return None;
        }
        let kind = FileChangeKind::for_tool(tool_name)?;
        let path = result.data_str("filepath")?.to_string();
        self.record(path.clone(), kind).then_some((path, kind))
    }

    pub fn contains(&self, path: &str) -> bool {
        self.created.iter().any(|p| p == path) || self.modified.iter().any(|p| p == path)
    }

    pub fn created(&self) -> &[String] {
        &self.created
    }

    pub fn modified(&self) -> &[String] {
        &self.modified
    }

    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.modified.is_empty()
    }
}

/// User-facing line announcing a file change, with an absolute `file://` link.
pub fn file_message(root: &Path, relative: &str, kind: FileChangeKind) -> String {
    let absolute = if Path::new(relative).is_absolute() {
        Path::new(relative).to_path_buf()
    } else {
        root.join(relative)
    };
    format!(
        "FILE {}: {} (file://{})",
        kind,
        relative,
        absolute.to_string_lossy().replace('\\', "/")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_touch_wins() {
        let mut files = FileTracker::new();

        assert!(files.record("a.txt", FileChangeKind::Created));
        assert!(!files.record("a.txt", FileChangeKind::Modified));
        assert!(files.record("b.txt", FileChangeKind::Modified));
        assert!(!files.record("b.txt", FileChangeKind::Created));

        assert_eq!(files.created(), ["a.txt"]);
        assert_eq!(files.modified(), ["b.txt"]);
    }

    #[test]
    fn test_insertion_order_kept() {
        let mut files = FileTracker::new();
        for name in ["z.txt", "a.txt", "m.txt", "a.txt"] {
            files.record(name, FileChangeKind::Created);
        }
        assert_eq!(files.created(), ["z.txt", "a.txt", "m.txt"]);
    }

    #[test]
    fn test_record_tool_result() {
        let mut files = FileTracker::new();
        let write = ToolResult::text("Wrote 2 bytes to src/a.rs")
            .with_data(serde_json::json!({ "filepath": "src/a.rs", "size": 2 }));
        let edit = ToolResult::text("Edited src/a.rs")
            .with_data(serde_json::json!({ "filepath": "src/a.rs" }));

        assert_eq!(
            files.record_tool_result("write_file", &write),
            Some(("src/a.rs".to_string(), FileChangeKind::Created))
        );
        assert_eq!(files.record_tool_result("edit_file", &edit), None);
        assert_eq!(files.created(), ["src/a.rs"]);
        assert!(files.modified().is_empty());
    }

    #[test]
    fn test_failed_or_readonly_tools_ignored() {
        let mut files = FileTracker::new();
        let failed = ToolResult::error("Could not find the specified text in a.txt")
            .with_data(serde_json::json!({ "filepath": "a.txt" }));
        let read = ToolResult::text("contents")
            .with_data(serde_json::json!({ "filepath": "a.txt" }));

        assert_eq!(files.record_tool_result("edit_file", &failed), None);
        assert_eq!(files.record_tool_result("read_file", &read), None);
        assert!(files.is_empty());
    }

    #[test]
    fn test_file_message_links_absolute_path() {
        let message = file_message(Path::new("/work"), "src/main.rs", FileChangeKind::Created);
        assert_eq!(message, "FILE created: src/main.rs (file:///work/src/main.rs)");
    }
}
