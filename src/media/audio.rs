//! Audio frame routing
//!
//! Attributes each incoming raw audio chunk to the original host or
//! client and pushes it to the audio broadcast server as one JSON text
//! frame. Runs on the capture SDK's delivery thread, so everything here
//! is non-blocking: classification is a map lookup and the broadcast only
//! queues on per-subscriber channels.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::Serialize;
use tokio_tungstenite::tungstenite::Message;

use crate::capture::AudioFrameSink;
use crate::media::segment::SegmentWriter;
use crate::roster::{ParticipantId, Role, RoleTracker};
use crate::server::BroadcastServer;

/// Role tag carried in the audio wire message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioSource {
    Host,
    Client,
}

impl AudioSource {
    pub fn as_str(self) -> &'static str {
        match self {
            AudioSource::Host => "host",
            AudioSource::Client => "client",
        }
    }
}

/// What happened to one routed chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOutcome {
    /// Chunk was pushed to this many subscribers
    Broadcast(usize),
    /// Identity is neither original role; chunk dropped, expected steady
    /// state when extra observers are in the room
    UnknownSource,
    /// Audio server is down; chunk dropped, restart request flagged
    ServerDown,
}

#[derive(Serialize)]
struct AudioMessage<'a> {
    source: &'a str,
    data: &'a str,
}

/// Serialize one chunk as `{"source":"<host|client>","data":"<base64>"}`
///
/// The payload is standard base64 of the raw bytes exactly as received;
/// no resampling or re-encoding.
pub fn encode_audio_message(source: AudioSource, payload: &[u8]) -> String {
    let data = BASE64.encode(payload);
    let message = AudioMessage {
        source: source.as_str(),
        data: &data,
    };
    // Two string fields; serialization cannot fail
    serde_json::to_string(&message).unwrap_or_default()
}

/// Classifies raw audio chunks by original role and forwards them
pub struct AudioFrameRouter {
    tracker: Arc<RoleTracker>,
    server: Arc<BroadcastServer>,
    segments: Option<SegmentWriter>,
}

impl AudioFrameRouter {
    pub fn new(tracker: Arc<RoleTracker>, server: Arc<BroadcastServer>) -> Self {
        Self {
            tracker,
            server,
            segments: None,
        }
    }

    /// Also accumulate per-role payloads into on-disk segments
    pub fn with_segment_writer(mut self, writer: SegmentWriter) -> Self {
        self.segments = Some(writer);
        self
    }

    /// Route one raw chunk tagged with its source identity
    pub fn route(&self, identity: ParticipantId, payload: &[u8]) -> RouteOutcome {
        let source = match self.tracker.classify(identity) {
            Role::Host => AudioSource::Host,
            Role::Client => AudioSource::Client,
            // Not an error; unknown sources are expected steady state
            Role::Unknown => return RouteOutcome::UnknownSource,
        };

        if let Some(writer) = &self.segments {
            if let Err(e) = writer.append(source, payload) {
                tracing::error!(error = %e, "Audio segment write failed");
            }
        }

        let text = encode_audio_message(source, payload);
        match self.server.broadcast(Message::text(text)) {
            Ok(sent) => RouteOutcome::Broadcast(sent),
            Err(_) => RouteOutcome::ServerDown,
        }
    }
}

impl AudioFrameSink for AudioFrameRouter {
    fn on_one_way_audio(&self, identity: ParticipantId, payload: &[u8]) {
        self.route(identity, payload);
    }

    // Mixed, share, and interpreter streams keep the trait's default
    // no-op behavior: only single-source per-participant audio is routed.
}
