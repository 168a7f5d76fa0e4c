// ABOUTME: Tool module - defines tools, results, and the per-task registry.
// ABOUTME: Core abstraction for sub-agent capabilities.

mod registry;
mod result;
mod traits;

pub use registry::*;
pub use result::*;
pub use traits::*;

#[cfg(test)]
mod result_test;
