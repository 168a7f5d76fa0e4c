// ABOUTME: Task input and result types plus the per-call ExecutionContext
// ABOUTME: that carries callbacks, predicates, and the tool registry.

mod context;
mod tracker;

pub use context::{
    ExecutionContext, MessageCallback, Predicate, ProgressCallback, TraceCallback,
};
pub use tracker::{FileChangeKind, FileTracker, file_message};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One unit of delegated work. Owned by the caller and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub name: String,
    pub description: String,
}

impl Task {
    /// Create a task with a fresh id.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            description: description.into(),
        }
    }

    /// Use a caller-assigned id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }
}

/// Terminal value of `SubAgent::execute`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskResult {
    pub success: bool,
    pub summary: String,
    pub files_created: Vec<String>,
    pub files_modified: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TaskResult {
    /// A successful result.
    pub fn succeeded(summary: impl Into<String>) -> Self {
        Self {
            success: true,
            summary: summary.into(),
            ..Default::default()
        }
    }

    /// A failed result; the error doubles as the summary.
    pub fn failed(error: impl Into<String>) -> Self {
        let error = error.into();
        Self {
            success: false,
            summary: error.clone(),
            error: Some(error),
            ..Default::default()
        }
    }

    /// Attach the files accumulated so far.
    pub fn with_files(mut self, files: &FileTracker) -> Self {
        self.files_created = files.created().to_vec();
        self.files_modified = files.modified().to_vec();
        self
    }
}

/// Severity of a message sent to the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessagePriority {
    Info,
    Warning,
    Error,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_ids_are_unique() {
        let a = Task::new("a", "first");
        let b = Task::new("a", "first");
        assert_ne!(a.id, b.id);
        assert_eq!(Task::new("x", "y").with_id("task-1").id, "task-1");
    }

    #[test]
    fn test_failed_result() {
        let result = TaskResult::failed("Cancelled by user");

        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("Cancelled by user"));
        assert!(result.files_created.is_empty());
    }

    #[test]
    fn test_result_with_files() {
        let mut files = FileTracker::default();
        files.record("a.txt", FileChangeKind::Created);
        files.record("b.txt", FileChangeKind::Modified);

        let result = TaskResult::succeeded("ok").with_files(&files);

        assert_eq!(result.files_created, vec!["a.txt"]);
        assert_eq!(result.files_modified, vec!["b.txt"]);
    }

    #[test]
    fn test_result_serialization() {
        let json = serde_json::to_value(TaskResult::succeeded("done")).unwrap();

        assert_eq!(json["success"], true);
        assert_eq!(json["summary"], "done");
        assert!(json.get("error").is_none());
        assert_eq!(
            serde_json::to_string(&MessagePriority::Warning).unwrap(),
            "\"warning\""
        );
    }
}
