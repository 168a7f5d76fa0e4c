// ABOUTME: SearchFilesTool - grep-like content search inside the sandbox.
// ABOUTME: Reports per-line matches with 1-based line numbers, capped in total.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::Sandbox;
use crate::tool::{Tool, ToolArgs, ToolParameter, ToolResult, parse_args};

const DEFAULT_MAX_MATCHES: usize = 50;

/// One matching line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchMatch {
    /// Path relative to the working directory.
    pub file: String,
    /// 1-based line number.
    pub line: usize,
    /// The matching line, trimmed.
    pub content: String,
}

/// Tool for searching file contents with regex patterns.
pub struct SearchFilesTool {
    sandbox: Arc<Sandbox>,
}

impl SearchFilesTool {
    pub fn new(sandbox: Arc<Sandbox>) -> Self {
        Self { sandbox }
    }

    fn search_file(
        &self,
        path: &Path,
        regex: &Regex,
        limit: usize,
        results: &mut Vec<SearchMatch>,
    ) {
        // Unreadable or non-UTF-8 files are skipped.
        let Ok(content) = std::fs::read_to_string(path) else {
            return;
        };
        let file = self.sandbox.relative(path);
        for (line_num, line) in content.lines().enumerate() {
            if results.len() >= limit {
                return;
            }
            if regex.is_match(line) {
                results.push(SearchMatch {
                    file: file.clone(),
                    line: line_num + 1,
                    content: line.trim().to_string(),
                });
            }
        }
    }
}

fn is_hidden(path: &Path, base: &Path) -> bool {
    path.strip_prefix(base)
        .map(|rel| {
            rel.components()
                .any(|c| c.as_os_str().to_string_lossy().starts_with('.'))
        })
        .unwrap_or(false)
}

#[async_trait]
impl Tool for SearchFilesTool {
    fn name(&self) -> &str {
        "search_files"
    }

    fn description(&self) -> &str {
        "Search file contents for a regex pattern. Returns file:line: content for each match."
    }

    fn parameters(&self) -> Vec<ToolParameter> {
        vec![
            ToolParameter::required("pattern", "Regex (or literal text) to search for"),
            ToolParameter::optional(
                "path",
                "File or directory to search, relative to the working directory (default: .)",
            ),
            ToolParameter::optional("max_matches", "Maximum number of matches (default: 50)"),
        ]
    }

    async fn execute(&self, args: &ToolArgs) -> ToolResult {
        #[derive(Deserialize)]
        struct Params {
            pattern: String,
            path: Option<String>,
            max_matches: Option<String>,
        }
        let params: Params = match parse_args(args) {
            Ok(p) => p,
            Err(e) => return ToolResult::error(e),
        };

        let limit = params
            .max_matches
            .and_then(|m| m.trim().parse::<usize>().ok())
            .unwrap_or(DEFAULT_MAX_MATCHES)
            .max(1);
        // One extra match tells us whether anything was cut.
        let scan_limit = limit.saturating_add(1);

        // Models often pass literal code; fall back to an escaped pattern.
        let regex = match Regex::new(&params.pattern) {
            Ok(r) => r,
            Err(_) => match Regex::new(&regex::escape(&params.pattern)) {
                Ok(r) => r,
                Err(e) => return ToolResult::error(format!("Invalid pattern: {}", e)),
            },
        };

        let requested = params.path.unwrap_or_else(|| ".".to_string());
        let base = match self.sandbox.resolve(&requested) {
            Ok(p) => p,
            Err(e) => return ToolResult::error(e.to_string()),
        };

        let mut results = Vec::new();
        if base.is_file() {
            self.search_file(&base, &regex, scan_limit, &mut results);
        } else if base.is_dir() {
            let full_pattern = format!(
                "{}/**/*",
                glob::Pattern::escape(&base.to_string_lossy())
            );
            let options = glob::MatchOptions {
                require_literal_leading_dot: true,
                ..Default::default()
            };
            let entries = match glob::glob_with(&full_pattern, options) {
                Ok(paths) => paths,
                Err(e) => return ToolResult::error(format!("Invalid search path: {}", e)),
            };
            for path in entries.flatten() {
                if results.len() >= scan_limit {
                    break;
                }
                if !path.is_file() || is_hidden(&path, &base) {
                    continue;
                }
                // Skip symlinks that lead out of the sandbox.
                match std::fs::canonicalize(&path) {
                    Ok(real) if real.starts_with(self.sandbox.root()) => {
                        self.search_file(&real, &regex, scan_limit, &mut results)
                    }
                    _ => continue,
                }
            }
        } else {
            return ToolResult::error(format!("Path not found: {}", requested));
        }

        let truncated = results.len() > limit;
        results.truncate(limit);
        let output = if results.is_empty() {
            "No matches found".to_string()
        } else {
            let lines: Vec<String> = results
                .iter()
                .map(|m| format!("{}:{}: {}", m.file, m.line, m.content))
                .collect();
            format!("Found {} matches:\n{}", results.len(), lines.join("\n"))
        };

        ToolResult::text(output).with_data(serde_json::json!({
            "matches": results,
            "truncated": truncated,
        }))
    }
}
