//! Connection registry implementation
//!
//! The thread-safe set of live subscribers for one broadcast service.
//! The listener's open/close/fail paths and the capture-side broadcast
//! callers all synchronize on the same mutex, held only for the duration
//! of a mutation or one full broadcast iteration.

use std::collections::HashMap;
use std::sync::Mutex;

use tokio_tungstenite::tungstenite::Message;

use super::handle::ConnectionHandle;

/// Thread-safe set of subscriber handles, unique by identity
///
/// Sends go through each handle's unbounded queue, so holding the lock
/// across a broadcast iteration never blocks on the network.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: Mutex<HashMap<u64, ConnectionHandle>>,
}

impl ConnectionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a subscriber handle
    ///
    /// Adding a handle whose identity is already present replaces it and
    /// leaves the size unchanged.
    pub fn add(&self, handle: ConnectionHandle) {
        let mut connections = self.connections.lock().unwrap();
        connections.insert(handle.id(), handle);
    }

    /// Remove a subscriber by identity
    pub fn remove(&self, id: u64) {
        let mut connections = self.connections.lock().unwrap();
        connections.remove(&id);
    }

    /// Visit every handle under the registry lock
    ///
    /// Must not be re-entered from within `f`; the lock is not reentrant.
    pub fn for_each(&self, mut f: impl FnMut(&ConnectionHandle)) {
        let connections = self.connections.lock().unwrap();
        for handle in connections.values() {
            f(handle);
        }
    }

    /// Number of live subscribers
    pub fn len(&self) -> usize {
        self.connections.lock().unwrap().len()
    }

    /// Whether the registry holds no subscribers
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop all subscribers
    pub fn clear(&self) {
        self.connections.lock().unwrap().clear();
    }

    /// Send a message to every subscriber, pruning dead ones
    ///
    /// A failed send marks that handle for removal; removals are applied
    /// after the iteration completes so the map is never mutated while it
    /// is being walked. Returns the number of subscribers that accepted
    /// the message. Iteration order across subscribers is unspecified.
    pub fn broadcast(&self, message: &Message) -> usize {
        let mut connections = self.connections.lock().unwrap();

        let mut failed: Vec<u64> = Vec::new();
        let mut sent = 0;

        for handle in connections.values() {
            if handle.send(message.clone()) {
                sent += 1;
            } else {
                failed.push(handle.id());
            }
        }

        for id in failed {
            connections.remove(&id);
            tracing::debug!(connection_id = id, "Dropped dead subscriber");
        }

        sent
    }
}
