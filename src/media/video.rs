//! Video frame-rate throttle
//!
//! Bounds the outbound video rate independent of the capture rate: at
//! most one frame per configured interval reaches the video broadcast
//! server, a leaky bucket of one. The first frame after startup or an
//! idle gap passes immediately; it is never aligned to a wall-clock grid.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::capture::VideoFrameSink;
use crate::media::frame::VideoFrame;
use crate::server::BroadcastServer;

/// Default minimum spacing between emitted video frames
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_secs(3);

/// Monotonic time source, injectable for tests
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// The real clock
#[derive(Debug, Default)]
pub struct MonotonicClock;

impl Clock for MonotonicClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Drops frames arriving faster than the configured interval
pub struct VideoFrameThrottler {
    server: Arc<BroadcastServer>,
    interval: Duration,
    clock: Arc<dyn Clock>,
    last_emit: Mutex<Option<Instant>>,
}

impl VideoFrameThrottler {
    pub fn new(server: Arc<BroadcastServer>, interval: Duration) -> Self {
        Self::with_clock(server, interval, Arc::new(MonotonicClock))
    }

    /// Throttler driven by an injected clock
    pub fn with_clock(
        server: Arc<BroadcastServer>,
        interval: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            server,
            interval,
            clock,
            last_emit: Mutex::new(None),
        }
    }

    /// Minimum spacing this instance enforces
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Offer one frame; returns whether it passed the throttle
    ///
    /// The reference timestamp resets on every pass, whether or not the
    /// broadcast itself succeeded, so a down server does not burst frames
    /// once revived.
    pub fn offer(&self, frame: &VideoFrame) -> bool {
        let now = self.clock.now();

        {
            let mut last_emit = self.last_emit.lock().unwrap();
            if let Some(previous) = *last_emit {
                if now.duration_since(previous) < self.interval {
                    return false;
                }
            }
            *last_emit = Some(now);
        }

        self.emit(frame);
        true
    }

    fn emit(&self, frame: &VideoFrame) {
        for message in frame.wire_messages() {
            if self.server.broadcast(message).is_err() {
                // Frame lost; the health monitor revives the listener
                tracing::debug!("Video frame dropped, server not running");
                return;
            }
        }
        tracing::debug!(
            width = frame.width(),
            height = frame.height(),
            "Video frame broadcast"
        );
    }
}

impl VideoFrameSink for VideoFrameThrottler {
    fn on_video_frame(&self, source_id: u32, frame: VideoFrame) {
        tracing::debug!(source_id, width = frame.width(), "Video frame received");
        self.offer(&frame);
    }
}
