// ABOUTME: Defines all error types for the handoff engine using thiserror.
// ABOUTME: Each concern has its own error enum, unified under HandoffError.

use std::path::PathBuf;

/// Top-level error type for the handoff engine.
#[derive(Debug, thiserror::Error)]
pub enum HandoffError {
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("SDK error: {0}")]
    Sdk(#[from] SdkError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Sandbox error: {0}")]
    Sandbox(#[from] SandboxError),
}

/// Errors raised by a text-completion backend.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("Backend returned an empty response")]
    EmptyResponse,

    #[error("{0}")]
    Other(#[source] anyhow::Error),
}

/// Errors raised by a third-party agent SDK.
#[derive(Debug, thiserror::Error)]
pub enum SdkError {
    #[error("{sdk} is not available: {reason}")]
    Unavailable { sdk: String, reason: String },

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Stream error: {0}")]
    Stream(String),
}

/// Errors from configuration loading and provider selection.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Unknown provider '{0}'. Expected one of: local, claude, codex")]
    UnknownProvider(String),

    #[error("Failed to parse config at {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Missing dependency for provider '{provider}': {what}")]
    MissingDependency { provider: String, what: String },
}

/// Errors from the filesystem sandbox.
#[derive(Debug, thiserror::Error)]
pub enum SandboxError {
    #[error("Path '{path}' is outside the working directory")]
    OutsideRoot { path: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
