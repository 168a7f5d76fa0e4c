// ABOUTME: Root module for handoff - backend-agnostic sub-agent task execution.
// ABOUTME: Re-exports all public types from submodules.

pub mod agent;
pub mod backend;
pub mod config;
pub mod error;
pub mod prelude;
pub mod protocol;
pub mod redact;
pub mod sdk;
pub mod task;
pub mod tool;
pub mod tools;
pub mod trace;

pub use error::HandoffError;
