// ABOUTME: CancelFlag - shared atomic flag set by SubAgent::cancel() and
// ABOUTME: observed at the next poll point of a running execution.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Best-effort cancellation flag. Clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Clear the flag; done at the start of every execute().
    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
