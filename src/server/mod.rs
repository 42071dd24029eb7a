//! WebSocket broadcast server and health monitoring
//!
//! One [`BroadcastServer`] owns a listener and a connection registry; the
//! relay runs two of them, audio on 8180 and video on 8080. A
//! [`HealthMonitor`] per server drives a stop/clear/reinit cycle whenever
//! the server is down or its accept loop has died, making the pair
//! self-healing under transient failures.

pub mod config;
pub mod listener;
pub mod monitor;
pub mod state;

pub use config::{ServerConfig, DEFAULT_AUDIO_PORT, DEFAULT_VIDEO_PORT};
pub use listener::BroadcastServer;
pub use monitor::{HealthMonitor, MonitorHandle, DEFAULT_MONITOR_INTERVAL};
pub use state::ServiceState;
