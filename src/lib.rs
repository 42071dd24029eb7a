//! meetcast — self-healing WebSocket fan-out for meeting-bot media capture
//!
//! Ingests raw audio and video frames from an external meeting-client SDK
//! and rebroadcasts them with minimal latency to WebSocket subscribers,
//! while tracking which participant identity holds which semantic role.
//!
//! # Components
//!
//! - [`ConnectionRegistry`]: thread-safe set of live subscriber handles.
//! - [`BroadcastServer`]: one listener + registry pair; two instances run
//!   per relay, audio (port 8180, JSON text frames) and video (port 8080,
//!   binary frames).
//! - [`HealthMonitor`]: background loop that restarts a dead or
//!   unresponsive server.
//! - [`RoleTracker`]: freezes the original host/client identities at the
//!   first roster scan; classifies audio sources against that snapshot.
//! - [`AudioFrameRouter`]: tags each audio chunk by original role and
//!   pushes it as `{"source":"<host|client>","data":"<base64>"}`.
//! - [`VideoFrameThrottler`]: enforces a minimum interval between emitted
//!   video frames (width, height, Y, U, V as five binary frames).
//!
//! # Example
//!
//! ```no_run
//! use meetcast::{MediaRelay, RelayConfig};
//!
//! # async fn run() {
//! let relay = MediaRelay::start(RelayConfig::default()).await;
//!
//! // SDK glue feeds these from its callbacks:
//! relay.audio_router().route(42, b"raw pcm");
//!
//! relay.shutdown().await;
//! # }
//! ```
//!
//! Degraded operation is preferred over crashing everywhere: bind
//! failures, dead subscribers, and unknown audio sources are contained
//! and logged, never propagated as process-fatal errors.

pub mod capture;
pub mod error;
pub mod media;
pub mod registry;
pub mod relay;
pub mod roster;
pub mod server;

pub use capture::{AudioFrameSink, VideoFrameSink};
pub use error::{Error, Result};
pub use media::{
    AudioFrameRouter, AudioSource, RouteOutcome, SegmentWriter, VideoFrame, VideoFrameThrottler,
};
pub use registry::{ConnectionHandle, ConnectionRegistry};
pub use relay::{MediaRelay, RelayConfig};
pub use roster::{ParticipantId, Role, RoleTracker, RosterEntry, RosterHooks, RosterWatcher};
pub use server::{BroadcastServer, HealthMonitor, MonitorHandle, ServerConfig, ServiceState};
