//! Shared early-exit signal for the combination search
//!
//! A single token is shared by every search worker. It is cancelled either
//! by the first worker that finds an exact match or from outside (the
//! binary's Ctrl+C handler holds a [`CancellationHandle`]).

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// Cancellation signal checked between combinations and between candidates
pub trait CancellationToken: Send + Sync + std::fmt::Debug {
    /// Has the search been asked to stop?
    fn is_cancelled(&self) -> bool;

    /// Ask every worker to stop
    fn cancel(&self);
}

/// `AtomicBool` token usable from rayon workers and async signal handlers alike
#[derive(Debug, Clone)]
pub struct AtomicCancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl AtomicCancellationToken {
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// A token that is already cancelled; the search returns before the first attempt
    pub fn cancelled() -> Self {
        let token = Self::new();
        token.cancel();
        token
    }

    /// Create a (token, handle) pair where the handle can only trigger and observe
    pub fn create_pair() -> (Self, CancellationHandle) {
        let token = Self::new();
        let handle = CancellationHandle {
            cancelled: token.cancelled.clone(),
        };
        (token, handle)
    }
}

impl Default for AtomicCancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancellationToken for AtomicCancellationToken {
    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }
}

/// Trigger side of a token, handed to signal handlers
#[derive(Debug, Clone)]
pub struct CancellationHandle {
    cancelled: Arc<AtomicBool>,
}

impl CancellationHandle {
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}
