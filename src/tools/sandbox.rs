// ABOUTME: Sandbox - binds tools to one working-directory root and resolves
// ABOUTME: requested paths, rejecting anything that escapes the root.

use std::path::{Component, Path, PathBuf};

use crate::error::SandboxError;

/// Working-directory root shared by all tools of one task.
#[derive(Debug, Clone)]
pub struct Sandbox {
    /// Canonical (absolute, symlinks resolved) root.
    root: PathBuf,
}

impl Sandbox {
    /// Create a sandbox rooted at `working_directory`.
    /// Creates the directory if it doesn't exist and resolves it to a canonical path.
    pub fn new(working_directory: impl AsRef<Path>) -> Result<Self, SandboxError> {
        let dir = working_directory.as_ref();
        std::fs::create_dir_all(dir)?;
        let root = std::fs::canonicalize(dir)?;
        Ok(Self { root })
    }

    /// The canonical root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a requested path against the root.
    ///
    /// The containment check runs on the resolved path, not the raw string:
    /// `..` components are folded lexically, then the deepest existing
    /// ancestor is canonicalized so symlinks cannot point outside the root.
    pub fn resolve(&self, requested: &str) -> Result<PathBuf, SandboxError> {
        let requested_path = Path::new(requested);
        let joined = if requested_path.is_absolute() {
            requested_path.to_path_buf()
        } else {
            self.root.join(requested_path)
        };

        let normalized = normalize(&joined);
        if !normalized.starts_with(&self.root) {
            return Err(SandboxError::OutsideRoot {
                path: requested.to_string(),
            });
        }

        // Walk up to the deepest ancestor that exists on disk.
        let mut existing = normalized.as_path();
        let mut missing = Vec::new();
        while existing.symlink_metadata().is_err() {
            match (existing.parent(), existing.file_name()) {
                (Some(parent), Some(name)) => {
                    missing.push(name.to_os_string());
                    existing = parent;
                }
                _ => break,
            }
        }

        let mut resolved = std::fs::canonicalize(existing)?;
        for name in missing.into_iter().rev() {
            resolved.push(name);
        }

        if resolved.starts_with(&self.root) {
            Ok(resolved)
        } else {
            Err(SandboxError::OutsideRoot {
                path: requested.to_string(),
            })
        }
    }

    /// Render a resolved path relative to the root ("." for the root itself).
    pub fn relative(&self, path: &Path) -> String {
        match path.strip_prefix(&self.root) {
            Ok(rel) if rel.as_os_str().is_empty() => ".".to_string(),
            Ok(rel) => rel.to_string_lossy().replace('\\', "/"),
            Err(_) => path.display().to_string(),
        }
    }
}

/// Fold `.` and `..` components without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_resolves_relative_paths_inside_root() {
        let dir = TempDir::new().unwrap();
        let sandbox = Sandbox::new(dir.path()).unwrap();

        let resolved = sandbox.resolve("src/main.rs").unwrap();
        assert!(resolved.starts_with(sandbox.root()));
        assert_eq!(sandbox.relative(&resolved), "src/main.rs");
    }

    #[test]
    fn test_dot_segments_are_folded() {
        let dir = TempDir::new().unwrap();
        let sandbox = Sandbox::new(dir.path()).unwrap();

        let resolved = sandbox.resolve("./a/../b/./c.txt").unwrap();
        assert_eq!(sandbox.relative(&resolved), "b/c.txt");
        assert_eq!(sandbox.relative(&sandbox.resolve(".").unwrap()), ".");
    }

    #[test]
    fn test_parent_escape_rejected() {
        let dir = TempDir::new().unwrap();
        let sandbox = Sandbox::new(dir.path()).unwrap();

        assert!(matches!(
            sandbox.resolve("../outside.txt"),
            Err(SandboxError::OutsideRoot { .. })
        ));
        assert!(sandbox.resolve("a/../../outside.txt").is_err());
    }

    #[test]
    fn test_absolute_path_outside_rejected() {
        let dir = TempDir::new().unwrap();
        let sandbox = Sandbox::new(dir.path()).unwrap();

        assert!(sandbox.resolve("/etc/passwd").is_err());

        let inside = sandbox.root().join("ok.txt");
        assert!(sandbox.resolve(inside.to_str().unwrap()).is_ok());
    }

    #[test]
    fn test_sibling_with_common_prefix_rejected() {
        let parent = TempDir::new().unwrap();
        let root = parent.path().join("work");
        let sibling = parent.path().join("work-other");
        std::fs::create_dir_all(&sibling).unwrap();
        let sandbox = Sandbox::new(&root).unwrap();

        assert!(sandbox.resolve("../work-other/file.txt").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_escape_rejected() {
        let outside = TempDir::new().unwrap();
        let dir = TempDir::new().unwrap();
        std::os::unix::fs::symlink(outside.path(), dir.path().join("link")).unwrap();
        let sandbox = Sandbox::new(dir.path()).unwrap();

        assert!(sandbox.resolve("link/secret.txt").is_err());
    }

    #[test]
    fn test_creates_missing_root() {
        let parent = TempDir::new().unwrap();
        let root = parent.path().join("fresh").join("nested");
        let sandbox = Sandbox::new(&root).unwrap();
        assert!(sandbox.root().is_dir());
    }
}
