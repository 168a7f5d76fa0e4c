// ABOUTME: Built-in sandboxed tools for sub-agent tasks.
// ABOUTME: File I/O, listing, content search and shell execution bound to one root.

mod command_filter;
mod edit_file;
mod list_files;
mod read_file;
mod sandbox;
mod search_files;
mod shell;
mod write_file;

use std::path::Path;
use std::sync::Arc;

pub use command_filter::{BlockedCommand, CommandFilter, default_denylist};
pub use edit_file::EditFileTool;
pub use list_files::ListFilesTool;
pub use read_file::ReadFileTool;
pub use sandbox::Sandbox;
pub use search_files::{SearchFilesTool, SearchMatch};
pub use shell::ShellTool;
pub use write_file::WriteFileTool;

use crate::error::SandboxError;
use crate::tool::Registry;

/// Build the standard toolset bound to `working_directory`.
///
/// Every tool shares one sandbox, so the root is created and canonicalized once.
pub fn sandboxed_tools(working_directory: impl AsRef<Path>) -> Result<Registry, SandboxError> {
    let sandbox = Arc::new(Sandbox::new(working_directory)?);
    let filter = Arc::new(CommandFilter::default());

    tracing::debug!(root = %sandbox.root().display(), "building sandboxed toolset");

    Ok(Registry::new()
        .with(ReadFileTool::new(sandbox.clone()))
        .with(WriteFileTool::new(sandbox.clone()))
        .with(EditFileTool::new(sandbox.clone()))
        .with(ListFilesTool::new(sandbox.clone()))
        .with(SearchFilesTool::new(sandbox.clone()))
        .with(ShellTool::new(sandbox, filter)))
}
