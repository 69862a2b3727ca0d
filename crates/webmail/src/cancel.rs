//! Cancellation tokens for results that may arrive after their consumer left

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared flag tied to the lifetime of a consuming view
///
/// Clones observe the same flag. Once cancelled a token stays cancelled;
/// consumers that come back get a fresh token.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
