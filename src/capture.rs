//! Capture collaborator boundary
//!
//! The meeting-client SDK delivers raw media synchronously on threads
//! this crate does not own. These traits are the only surface the SDK
//! glue needs to drive; implementations must return quickly and must not
//! block on network I/O beyond the registry's queue-only broadcast.

use crate::media::frame::VideoFrame;
use crate::roster::ParticipantId;

/// Receiver for the SDK's raw audio delivery callbacks
///
/// Only the one-way per-participant stream carries routed audio; the
/// mixed, share, and interpreter streams default to no-ops.
pub trait AudioFrameSink: Send + Sync {
    /// Per-participant audio chunk tagged with its source identity
    fn on_one_way_audio(&self, identity: ParticipantId, payload: &[u8]);

    /// Mixed room audio; ignored, separate per-source streams are wanted
    fn on_mixed_audio(&self, _payload: &[u8]) {}

    /// Shared-content audio; ignored
    fn on_share_audio(&self, _payload: &[u8]) {}

    /// Interpreter channel audio; ignored
    fn on_interpreter_audio(&self, _payload: &[u8], _language: Option<&str>) {}
}

/// Receiver for the SDK's raw video delivery callbacks
pub trait VideoFrameSink: Send + Sync {
    /// One planar frame from the renderer, tagged with its stream source id
    fn on_video_frame(&self, source_id: u32, frame: VideoFrame);

    /// Raw data pipeline went on or off; reporting only
    fn on_raw_data_status(&self, active: bool) {
        tracing::info!(active, "Raw data status changed");
    }
}
