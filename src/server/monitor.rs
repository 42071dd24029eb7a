//! Broadcast server health monitor
//!
//! Keeps a [`BroadcastServer`] eventually running without external
//! intervention. The monitor restarts the server when its state is not
//! `Running`, when a restart was requested by a failed broadcast, or when
//! the state claims `Running` but the accept loop has died. Worst case
//! downtime after a failure is one monitoring interval.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::server::listener::BroadcastServer;
use crate::server::state::ServiceState;

/// Default spacing between health checks
pub const DEFAULT_MONITOR_INTERVAL: Duration = Duration::from_secs(5);

/// Spawns the poll loop watching one broadcast server
pub struct HealthMonitor;

/// Owned handle to a running monitor task
///
/// The task never outlives this handle: [`shutdown`](Self::shutdown)
/// signals the stop flag and joins the loop.
pub struct MonitorHandle {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl HealthMonitor {
    /// Start monitoring `server`, checking every `interval`
    pub fn spawn(server: Arc<BroadcastServer>, interval: Duration) -> MonitorHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(monitor_loop(server, interval, shutdown_rx));
        MonitorHandle {
            shutdown: shutdown_tx,
            handle,
        }
    }
}

impl MonitorHandle {
    /// Stop the monitor loop and wait for it to exit
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        let _ = self.handle.await;
    }
}

async fn monitor_loop(
    server: Arc<BroadcastServer>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        if *shutdown.borrow() {
            break;
        }

        check_once(&server).await;

        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = shutdown.changed() => break,
        }
    }
    tracing::debug!("Health monitor stopped");
}

/// One monitoring iteration; any failure is logged and swallowed so the
/// loop keeps running
async fn check_once(server: &BroadcastServer) {
    let state = server.state();
    let restart_requested = server.take_restart_request();

    if state != ServiceState::Running || restart_requested {
        tracing::warn!(?state, restart_requested, "Broadcast server is down, restarting");
        if let Err(e) = server.restart().await {
            tracing::error!(error = %e, "Broadcast server restart failed");
        }
    } else if !server.is_listening() {
        tracing::warn!("Broadcast server became unresponsive, restarting");
        if let Err(e) = server.restart().await {
            tracing::error!(error = %e, "Broadcast server restart failed");
        }
    }
}
