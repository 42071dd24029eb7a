//! WebSocket broadcast server
//!
//! Owns one listener and its connection registry, accepts subscriber
//! connections on a dedicated task, and pushes outbound frames to every
//! current subscriber. Recovery from a dead or unbound listener is the
//! health monitor's job; this component only reports failure through its
//! state and return values.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;

use crate::error::{Error, Result};
use crate::registry::{ConnectionHandle, ConnectionRegistry};
use crate::server::config::ServerConfig;
use crate::server::state::{ServiceState, StateCell};

/// Accept-loop task owned by a running server
#[derive(Debug)]
struct ListenerTask {
    local_addr: SocketAddr,
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

/// Self-healing WebSocket push server
///
/// Two independent instances exist in a relay: one for audio frames, one
/// for video frames. `broadcast` is synchronous and non-blocking (sends
/// only queue on per-subscriber channels), so it is safe to call from
/// capture SDK callback threads.
pub struct BroadcastServer {
    config: ServerConfig,
    registry: Arc<ConnectionRegistry>,
    state: StateCell,
    restart_requested: AtomicBool,
    next_connection_id: Arc<AtomicU64>,
    listener: Mutex<Option<ListenerTask>>,
}

impl BroadcastServer {
    /// Create a server in `Stopped` state; call [`start`](Self::start) to bind
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            registry: Arc::new(ConnectionRegistry::new()),
            state: StateCell::new(ServiceState::Stopped),
            restart_requested: AtomicBool::new(false),
            next_connection_id: Arc::new(AtomicU64::new(1)),
            listener: Mutex::new(None),
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> ServiceState {
        self.state.load()
    }

    /// The connection registry for this server
    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// Address the listener is bound to, if it is running
    ///
    /// Differs from the configured address when binding port 0.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.listener.lock().unwrap().as_ref().map(|t| t.local_addr)
    }

    /// Bind the listener and start the accept loop
    ///
    /// Transitions Stopped/Failed → Starting → Running. A bind failure
    /// leaves the server in `Failed` state; it is not retried here.
    /// Calling `start` on a server that is already running is a no-op.
    pub async fn start(&self) -> Result<()> {
        match self.state.load() {
            ServiceState::Running | ServiceState::Starting => return Ok(()),
            ServiceState::Stopped | ServiceState::Failed => {}
        }
        self.state.store(ServiceState::Starting);

        let listener = match TcpListener::bind(self.config.bind_addr).await {
            Ok(listener) => listener,
            Err(e) => {
                self.state.store(ServiceState::Failed);
                tracing::error!(
                    addr = %self.config.bind_addr,
                    error = %e,
                    "Failed to bind broadcast listener"
                );
                return Err(Error::Bind {
                    addr: self.config.bind_addr,
                    source: e,
                });
            }
        };

        let local_addr = match listener.local_addr() {
            Ok(addr) => addr,
            Err(e) => {
                self.state.store(ServiceState::Failed);
                return Err(Error::Bind {
                    addr: self.config.bind_addr,
                    source: e,
                });
            }
        };

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(accept_loop(
            listener,
            Arc::clone(&self.registry),
            Arc::clone(&self.next_connection_id),
            shutdown_rx,
            self.config.tcp_nodelay,
        ));

        *self.listener.lock().unwrap() = Some(ListenerTask {
            local_addr,
            shutdown: shutdown_tx,
            handle,
        });
        self.state.store(ServiceState::Running);

        tracing::info!(addr = %local_addr, "Broadcast server listening");
        Ok(())
    }

    /// Stop the accept loop, join it, and drop all subscribers
    ///
    /// Idempotent; safe to call when already stopped.
    pub async fn stop(&self) {
        let task = self.listener.lock().unwrap().take();

        if let Some(task) = task {
            let _ = task.shutdown.send(true);
            if task.handle.await.is_err() {
                tracing::error!("Accept loop terminated abnormally");
            }
        }

        self.registry.clear();
        self.state.store(ServiceState::Stopped);
        tracing::info!(addr = %self.config.bind_addr, "Broadcast server stopped");
    }

    /// Full stop/clear/reinit cycle; used by the health monitor
    pub async fn restart(&self) -> Result<()> {
        tracing::info!(addr = %self.config.bind_addr, "Restarting broadcast server");
        self.stop().await;
        self.start().await
    }

    /// Push one message to every current subscriber
    ///
    /// Returns the number of subscribers that accepted the message. If the
    /// server is not running, no send happens; a restart request is flagged
    /// for the health monitor and `Err(NotRunning)` is returned.
    pub fn broadcast(&self, message: Message) -> Result<usize> {
        if self.state.load() != ServiceState::Running {
            self.restart_requested.store(true, Ordering::Release);
            tracing::warn!(
                addr = %self.config.bind_addr,
                "Broadcast while server is down, restart requested"
            );
            return Err(Error::NotRunning);
        }

        if self.registry.is_empty() {
            return Ok(0);
        }

        Ok(self.registry.broadcast(&message))
    }

    /// Consume a pending restart request, if one was flagged
    pub fn take_restart_request(&self) -> bool {
        self.restart_requested.swap(false, Ordering::AcqRel)
    }

    /// Whether the accept loop is live
    ///
    /// A server can claim `Running` while its accept task has died; the
    /// health monitor uses this probe to catch that case.
    pub fn is_listening(&self) -> bool {
        self.listener
            .lock()
            .unwrap()
            .as_ref()
            .map(|t| !t.handle.is_finished())
            .unwrap_or(false)
    }

    #[cfg(test)]
    pub(crate) fn kill_accept_loop(&self) {
        if let Some(task) = self.listener.lock().unwrap().as_ref() {
            task.handle.abort();
        }
    }
}

/// Accept subscriber connections until shutdown is signalled
async fn accept_loop(
    listener: TcpListener,
    registry: Arc<ConnectionRegistry>,
    next_connection_id: Arc<AtomicU64>,
    mut shutdown: watch::Receiver<bool>,
    tcp_nodelay: bool,
) {
    loop {
        tokio::select! {
            _ = shutdown.changed() => break,
            accepted = listener.accept() => match accepted {
                Ok((socket, peer_addr)) => {
                    if tcp_nodelay {
                        let _ = socket.set_nodelay(true);
                    }
                    let id = next_connection_id.fetch_add(1, Ordering::Relaxed);
                    tokio::spawn(subscriber_task(socket, peer_addr, id, Arc::clone(&registry)));
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to accept connection");
                }
            }
        }
    }
}

/// Drive one subscriber: register on upgrade, forward queued frames,
/// deregister on close or failure
async fn subscriber_task(
    socket: TcpStream,
    peer_addr: SocketAddr,
    id: u64,
    registry: Arc<ConnectionRegistry>,
) {
    let ws_stream = match tokio_tungstenite::accept_async(socket).await {
        Ok(ws) => ws,
        Err(e) => {
            tracing::debug!(peer = %peer_addr, error = %e, "WebSocket handshake failed");
            return;
        }
    };

    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel();
    registry.add(ConnectionHandle::new(id, peer_addr, outbound_tx));
    tracing::info!(
        connection_id = id,
        peer = %peer_addr,
        connections = registry.len(),
        "Subscriber connected"
    );

    let (mut sink, mut source) = ws_stream.split();

    loop {
        tokio::select! {
            outbound = outbound_rx.recv() => match outbound {
                Some(message) => {
                    if let Err(e) = sink.send(message).await {
                        tracing::debug!(connection_id = id, error = %e, "Send to subscriber failed");
                        break;
                    }
                }
                // Registry cleared or handle replaced
                None => break,
            },
            inbound = source.next() => match inbound {
                Some(Ok(message)) if message.is_close() => break,
                // Push-only stream; inbound payloads are ignored
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::debug!(connection_id = id, error = %e, "Subscriber connection failed");
                    break;
                }
                None => break,
            }
        }
    }

    registry.remove(id);
    tracing::info!(
        connection_id = id,
        connections = registry.len(),
        "Subscriber disconnected"
    );
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn loopback_server() -> BroadcastServer {
        BroadcastServer::new(ServerConfig::with_addr("127.0.0.1:0".parse().unwrap()))
    }

    async fn wait_for_subscribers(server: &BroadcastServer, n: usize) {
        for _ in 0..200 {
            if server.registry().len() >= n {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("expected {} subscribers to attach", n);
    }

    #[tokio::test]
    async fn test_start_stop_lifecycle() {
        let server = loopback_server();
        assert_eq!(server.state(), ServiceState::Stopped);
        assert!(!server.is_listening());

        server.start().await.unwrap();
        assert_eq!(server.state(), ServiceState::Running);
        assert!(server.is_listening());
        assert!(server.local_addr().is_some());

        // Starting again is a no-op
        server.start().await.unwrap();

        server.stop().await;
        assert_eq!(server.state(), ServiceState::Stopped);
        assert!(!server.is_listening());

        // Stop is idempotent
        server.stop().await;
        assert_eq!(server.state(), ServiceState::Stopped);
    }

    #[tokio::test]
    async fn test_bind_failure_leaves_failed_state() {
        let first = loopback_server();
        first.start().await.unwrap();
        let taken = first.local_addr().unwrap();

        let second = BroadcastServer::new(ServerConfig::with_addr(taken));
        let result = second.start().await;
        assert!(matches!(result, Err(Error::Bind { .. })));
        assert_eq!(second.state(), ServiceState::Failed);

        first.stop().await;
    }

    #[tokio::test]
    async fn test_broadcast_while_down_requests_restart() {
        let server = loopback_server();

        let result = server.broadcast(Message::text("frame"));
        assert!(matches!(result, Err(Error::NotRunning)));
        assert!(server.take_restart_request());
        // Request was consumed
        assert!(!server.take_restart_request());
    }

    #[tokio::test]
    async fn test_broadcast_reaches_all_subscribers() {
        let server = loopback_server();
        server.start().await.unwrap();
        let addr = server.local_addr().unwrap();
        let url = format!("ws://{}", addr);

        let (mut first, _) = tokio_tungstenite::connect_async(url.as_str()).await.unwrap();
        let (mut second, _) = tokio_tungstenite::connect_async(url.as_str()).await.unwrap();
        wait_for_subscribers(&server, 2).await;

        let sent = server.broadcast(Message::text("hello")).unwrap();
        assert_eq!(sent, 2);

        for ws in [&mut first, &mut second] {
            let received = tokio::time::timeout(Duration::from_secs(2), ws.next())
                .await
                .unwrap()
                .unwrap()
                .unwrap();
            assert_eq!(received.into_text().unwrap(), "hello");
        }

        server.stop().await;
    }

    #[tokio::test]
    async fn test_disconnected_subscriber_is_pruned() {
        let server = loopback_server();
        server.start().await.unwrap();
        let url = format!("ws://{}", server.local_addr().unwrap());

        let (first, _) = tokio_tungstenite::connect_async(url.as_str()).await.unwrap();
        let (mut second, _) = tokio_tungstenite::connect_async(url.as_str()).await.unwrap();
        wait_for_subscribers(&server, 2).await;

        drop(first);
        // Wait for the server side of the dropped connection to unwind
        for _ in 0..200 {
            if server.registry().len() == 1 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(server.registry().len(), 1);

        server.broadcast(Message::text("still here")).unwrap();
        let received = tokio::time::timeout(Duration::from_secs(2), second.next())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        assert_eq!(received.into_text().unwrap(), "still here");

        server.stop().await;
    }

    #[tokio::test]
    async fn test_stop_clears_registry() {
        let server = loopback_server();
        server.start().await.unwrap();
        let url = format!("ws://{}", server.local_addr().unwrap());

        let (_ws, _) = tokio_tungstenite::connect_async(url.as_str()).await.unwrap();
        wait_for_subscribers(&server, 1).await;

        server.stop().await;
        assert!(server.registry().is_empty());
    }
}
