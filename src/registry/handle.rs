//! Subscriber connection handles
//!
//! A handle is the registry's view of one WebSocket subscriber: a stable
//! numeric identity plus the outbound message queue feeding that
//! subscriber's writer task. The handle never owns the connection's
//! lifetime; dropping it only closes the queue.

use std::net::SocketAddr;

use tokio::sync::mpsc::UnboundedSender;
use tokio_tungstenite::tungstenite::Message;

/// Identity and outbound queue of one subscriber connection
///
/// Equality and hashing use the identity only, so a handle can be looked
/// up in the registry regardless of the queue it carries. This mirrors the
/// open/close/fail callbacks all referring to the same connection by id.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    id: u64,
    peer_addr: SocketAddr,
    outbound: UnboundedSender<Message>,
}

impl ConnectionHandle {
    /// Create a handle for a newly accepted connection
    pub fn new(id: u64, peer_addr: SocketAddr, outbound: UnboundedSender<Message>) -> Self {
        Self {
            id,
            peer_addr,
            outbound,
        }
    }

    /// Stable connection identity
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Remote peer address
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    /// Queue a message for this subscriber
    ///
    /// Returns `false` if the subscriber's writer task has gone away.
    /// Never blocks; the queue is unbounded.
    pub fn send(&self, message: Message) -> bool {
        self.outbound.send(message).is_ok()
    }
}

impl PartialEq for ConnectionHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ConnectionHandle {}

impl std::hash::Hash for ConnectionHandle {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn handle(id: u64) -> (ConnectionHandle, mpsc::UnboundedReceiver<Message>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            ConnectionHandle::new(id, "127.0.0.1:9000".parse().unwrap(), tx),
            rx,
        )
    }

    #[test]
    fn test_equality_by_identity() {
        let (a, _rx_a) = handle(1);
        let (b, _rx_b) = handle(1);
        let (c, _rx_c) = handle(2);

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_send_after_receiver_dropped() {
        let (h, rx) = handle(1);
        assert!(h.send(Message::text("up")));

        drop(rx);
        assert!(!h.send(Message::text("down")));
    }
}
