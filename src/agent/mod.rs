// ABOUTME: Sub-agent module - the SubAgent contract, provider selection,
// ABOUTME: the local text-protocol loop, and dispatch over all backends.

mod cancel;
mod dispatch;
mod local;
mod provider;

pub use cancel::CancelFlag;
pub use dispatch::{AgentBuilder, AnySubAgent};
pub use local::{CANCELLED, LocalLoopAgent};
pub use provider::Provider;

pub(crate) use local::run_tool;

use async_trait::async_trait;

use crate::task::{ExecutionContext, Task, TaskResult};

/// A backend-agnostic worker that executes one task end-to-end.
///
/// `execute` never fails: backend errors, cancellation, and SDK
/// unavailability all come back as a failed [`TaskResult`]. An instance may
/// be reused for several tasks, one at a time.
#[async_trait]
pub trait SubAgent: Send + Sync {
    /// Which backend this agent drives.
    fn provider(&self) -> Provider;

    /// Run `task` to completion.
    async fn execute(&self, task: &Task, ctx: ExecutionContext) -> TaskResult;

    /// Request cancellation; observed at the next poll point.
    fn cancel(&self);
}
