//! Broadcast service lifecycle state
//!
//! The state cell is written by whichever task drives a lifecycle
//! transition and read from the capture callback threads and the health
//! monitor, so loads and stores use acquire/release ordering.

use std::sync::atomic::{AtomicU8, Ordering};

/// Lifecycle state of one broadcast service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceState {
    /// Created or shut down; no listener exists
    Stopped,
    /// Listener is binding
    Starting,
    /// Accept loop is live
    Running,
    /// Bind or listener failure; waiting for the health monitor
    Failed,
}

/// Atomic cell holding a [`ServiceState`]
#[derive(Debug)]
pub(crate) struct StateCell(AtomicU8);

impl StateCell {
    pub(crate) fn new(state: ServiceState) -> Self {
        Self(AtomicU8::new(state as u8))
    }

    pub(crate) fn load(&self) -> ServiceState {
        match self.0.load(Ordering::Acquire) {
            0 => ServiceState::Stopped,
            1 => ServiceState::Starting,
            2 => ServiceState::Running,
            _ => ServiceState::Failed,
        }
    }

    pub(crate) fn store(&self, state: ServiceState) {
        self.0.store(state as u8, Ordering::Release);
    }
}
