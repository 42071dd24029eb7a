//! Media framing and routing
//!
//! The active data path: raw chunks from the capture collaborator become
//! wire frames for the broadcast servers. Audio is attributed by original
//! role and pushed immediately; video passes through a per-instance
//! frame-rate throttle first.

pub mod audio;
pub mod frame;
pub mod segment;
pub mod video;

pub use audio::{encode_audio_message, AudioFrameRouter, AudioSource, RouteOutcome};
pub use frame::VideoFrame;
pub use segment::{SegmentWriter, DEFAULT_SEGMENT_THRESHOLD};
pub use video::{Clock, MonotonicClock, VideoFrameThrottler, DEFAULT_FRAME_INTERVAL};
