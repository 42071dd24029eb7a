//! Relay assembly
//!
//! Wires the full pipeline together: two broadcast servers with their
//! health monitors, one role tracker, and the audio/video entry points
//! the capture SDK glue feeds.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::media::{
    AudioFrameRouter, SegmentWriter, VideoFrameThrottler, DEFAULT_FRAME_INTERVAL,
};
use crate::roster::{RoleTracker, RosterHooks, RosterWatcher};
use crate::server::{
    BroadcastServer, HealthMonitor, MonitorHandle, ServerConfig, DEFAULT_MONITOR_INTERVAL,
};

/// Configuration for a complete media relay
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Audio broadcast service (default 0.0.0.0:8180)
    pub audio: ServerConfig,

    /// Video broadcast service (default 0.0.0.0:8080)
    pub video: ServerConfig,

    /// Spacing between health checks (default 5 s)
    pub monitor_interval: Duration,

    /// Minimum spacing between emitted video frames (default 3 s)
    pub frame_interval: Duration,

    /// Dump per-role audio segments under this directory; off when unset
    pub segment_dir: Option<PathBuf>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            audio: ServerConfig::audio(),
            video: ServerConfig::video(),
            monitor_interval: DEFAULT_MONITOR_INTERVAL,
            frame_interval: DEFAULT_FRAME_INTERVAL,
            segment_dir: None,
        }
    }
}

impl RelayConfig {
    /// Set the audio bind address
    pub fn audio_bind(mut self, addr: std::net::SocketAddr) -> Self {
        self.audio.bind_addr = addr;
        self
    }

    /// Set the video bind address
    pub fn video_bind(mut self, addr: std::net::SocketAddr) -> Self {
        self.video.bind_addr = addr;
        self
    }

    /// Set the health check interval
    pub fn monitor_interval(mut self, interval: Duration) -> Self {
        self.monitor_interval = interval;
        self
    }

    /// Set the video throttle interval
    pub fn frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = interval;
        self
    }

    /// Enable per-role audio segment dumps
    pub fn segment_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.segment_dir = Some(dir.into());
        self
    }
}

/// A running relay: both broadcast services, their monitors, and the
/// capture-side entry points
pub struct MediaRelay {
    audio: Arc<BroadcastServer>,
    video: Arc<BroadcastServer>,
    tracker: Arc<RoleTracker>,
    router: Arc<AudioFrameRouter>,
    throttler: Arc<VideoFrameThrottler>,
    watcher: RosterWatcher,
    monitors: Vec<MonitorHandle>,
}

impl MediaRelay {
    /// Start the relay with no roster hooks attached
    pub async fn start(config: RelayConfig) -> Self {
        Self::start_with_hooks(config, Box::new(crate::roster::NoHooks)).await
    }

    /// Start both services and their monitors
    ///
    /// A bind failure is not fatal: the affected server stays `Failed`
    /// and its monitor keeps retrying, so the session can outlive a
    /// temporarily occupied port.
    pub async fn start_with_hooks(config: RelayConfig, hooks: Box<dyn RosterHooks>) -> Self {
        let audio = Arc::new(BroadcastServer::new(config.audio.clone()));
        let video = Arc::new(BroadcastServer::new(config.video.clone()));

        if let Err(e) = audio.start().await {
            tracing::error!(error = %e, "Audio broadcast server failed to start");
        }
        if let Err(e) = video.start().await {
            tracing::error!(error = %e, "Video broadcast server failed to start");
        }

        let monitors = vec![
            HealthMonitor::spawn(Arc::clone(&audio), config.monitor_interval),
            HealthMonitor::spawn(Arc::clone(&video), config.monitor_interval),
        ];

        let tracker = Arc::new(RoleTracker::new());

        let mut router = AudioFrameRouter::new(Arc::clone(&tracker), Arc::clone(&audio));
        if let Some(dir) = config.segment_dir {
            router = router.with_segment_writer(SegmentWriter::new(dir));
        }

        let throttler = VideoFrameThrottler::new(Arc::clone(&video), config.frame_interval);
        let watcher = RosterWatcher::new(Arc::clone(&tracker), hooks);

        Self {
            audio,
            video,
            tracker,
            router: Arc::new(router),
            throttler: Arc::new(throttler),
            watcher,
            monitors,
        }
    }

    /// Audio entry point for the capture SDK glue
    pub fn audio_router(&self) -> &Arc<AudioFrameRouter> {
        &self.router
    }

    /// Video entry point for the capture SDK glue
    pub fn video_throttler(&self) -> &Arc<VideoFrameThrottler> {
        &self.throttler
    }

    /// Roster event entry point
    pub fn roster(&self) -> &RosterWatcher {
        &self.watcher
    }

    /// The shared role tracker
    pub fn role_tracker(&self) -> &Arc<RoleTracker> {
        &self.tracker
    }

    /// The audio broadcast server
    pub fn audio_server(&self) -> &Arc<BroadcastServer> {
        &self.audio
    }

    /// The video broadcast server
    pub fn video_server(&self) -> &Arc<BroadcastServer> {
        &self.video
    }

    /// Stop monitors first, then both servers, joining every task
    pub async fn shutdown(mut self) {
        for monitor in self.monitors.drain(..) {
            monitor.shutdown().await;
        }
        self.audio.stop().await;
        self.video.stop().await;
        tracing::info!("Media relay stopped");
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use futures_util::StreamExt;
    use tokio_tungstenite::tungstenite::Message;

    use super::*;
    use crate::roster::RosterEntry;
    use crate::server::ServiceState;

    fn loopback_config() -> RelayConfig {
        RelayConfig::default()
            .audio_bind("127.0.0.1:0".parse().unwrap())
            .video_bind("127.0.0.1:0".parse().unwrap())
            .monitor_interval(Duration::from_millis(50))
            .frame_interval(Duration::from_millis(10))
    }

    fn entry(id: u32, is_self: bool, is_host: bool) -> RosterEntry {
        RosterEntry {
            id,
            is_self,
            is_host,
            display_name: None,
        }
    }

    #[tokio::test]
    async fn test_relay_starts_both_services() {
        let relay = MediaRelay::start(loopback_config()).await;

        assert_eq!(relay.audio_server().state(), ServiceState::Running);
        assert_eq!(relay.video_server().state(), ServiceState::Running);
        assert_ne!(
            relay.audio_server().local_addr(),
            relay.video_server().local_addr()
        );

        relay.shutdown().await;
    }

    #[tokio::test]
    async fn test_audio_path_end_to_end() {
        let relay = MediaRelay::start(loopback_config()).await;
        relay
            .roster()
            .roster_scanned(&[entry(1, true, false), entry(2, false, true), entry(3, false, false)]);

        let url = format!("ws://{}", relay.audio_server().local_addr().unwrap());
        let (mut ws, _) = tokio_tungstenite::connect_async(url.as_str()).await.unwrap();
        for _ in 0..200 {
            if !relay.audio_server().registry().is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        relay.audio_router().route(3, b"abc");
        let received = tokio::time::timeout(Duration::from_secs(2), ws.next())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        assert_eq!(
            received.into_text().unwrap(),
            r#"{"source":"client","data":"YWJj"}"#
        );

        relay.shutdown().await;
    }

    #[tokio::test]
    async fn test_video_path_emits_five_binary_frames() {
        use bytes::Bytes;

        let relay = MediaRelay::start(loopback_config()).await;
        let url = format!("ws://{}", relay.video_server().local_addr().unwrap());
        let (mut ws, _) = tokio_tungstenite::connect_async(url.as_str()).await.unwrap();
        for _ in 0..200 {
            if !relay.video_server().registry().is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        let frame = crate::media::VideoFrame::new(
            4,
            2,
            Bytes::from(vec![9u8; 8]),
            Bytes::from(vec![8u8; 2]),
            Bytes::from(vec![7u8; 2]),
        )
        .unwrap();
        assert!(relay.video_throttler().offer(&frame));

        let mut frames = Vec::new();
        for _ in 0..5 {
            let message = tokio::time::timeout(Duration::from_secs(2), ws.next())
                .await
                .unwrap()
                .unwrap()
                .unwrap();
            match message {
                Message::Binary(data) => frames.push(data),
                other => panic!("expected binary frame, got {:?}", other),
            }
        }

        assert_eq!(frames[0], 4u32.to_le_bytes().to_vec());
        assert_eq!(frames[1], 2u32.to_le_bytes().to_vec());
        assert_eq!(frames[2], vec![9u8; 8]);
        assert_eq!(frames[3], vec![8u8; 2]);
        assert_eq!(frames[4], vec![7u8; 2]);

        relay.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_stops_everything() {
        let relay = MediaRelay::start(loopback_config()).await;
        let audio = Arc::clone(relay.audio_server());
        let video = Arc::clone(relay.video_server());

        relay.shutdown().await;

        assert_eq!(audio.state(), ServiceState::Stopped);
        assert_eq!(video.state(), ServiceState::Stopped);
        assert!(audio.registry().is_empty());
    }
}
