//! Media relay demo with synthetic capture feeds
//!
//! Run with: cargo run --example relay_server
//!
//! Starts the audio service on ws://0.0.0.0:8180 and the video service on
//! ws://0.0.0.0:8080, then feeds them synthetic frames the way the
//! meeting SDK glue would.
//!
//! ## Subscribing
//!
//! Audio (JSON text frames):
//!   websocat ws://127.0.0.1:8180
//!
//! Video (binary frames: width, height, Y, U, V):
//!   websocat -b ws://127.0.0.1:8080
//!
//! Ctrl-C shuts the relay down, joining every background task.

use std::time::Duration;

use bytes::Bytes;
use meetcast::{
    AudioFrameSink, MediaRelay, RelayConfig, RosterEntry, VideoFrame, VideoFrameSink,
};

const HOST_ID: u32 = 1001;
const CLIENT_ID: u32 = 1002;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "meetcast=debug".into()),
        )
        .init();

    let relay = MediaRelay::start(RelayConfig::default()).await;

    // Simulate the session-start roster scan
    relay.roster().roster_scanned(&[
        RosterEntry {
            id: 1,
            is_self: true,
            is_host: false,
            display_name: Some("relay-bot".into()),
        },
        RosterEntry {
            id: HOST_ID,
            is_self: false,
            is_host: true,
            display_name: Some("Alice".into()),
        },
        RosterEntry {
            id: CLIENT_ID,
            is_self: false,
            is_host: false,
            display_name: Some("Bob".into()),
        },
    ]);

    // Synthetic capture feeds
    let audio = relay.audio_router().clone();
    let audio_feed = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_millis(100));
        let mut from_host = true;
        loop {
            ticker.tick().await;
            let identity = if from_host { HOST_ID } else { CLIENT_ID };
            audio.on_one_way_audio(identity, &[0u8; 640]);
            from_host = !from_host;
        }
    });

    let video = relay.video_throttler().clone();
    let video_feed = tokio::spawn(async move {
        let width = 640u32;
        let height = 480u32;
        let luma = (width * height) as usize;
        let frame = VideoFrame::new(
            width,
            height,
            Bytes::from(vec![0x80; luma]),
            Bytes::from(vec![0x80; luma / 4]),
            Bytes::from(vec![0x80; luma / 4]),
        )
        .expect("static plane sizes are valid");

        let mut ticker = tokio::time::interval(Duration::from_millis(200));
        loop {
            ticker.tick().await;
            video.on_video_frame(0, frame.clone());
        }
    });

    if let Err(e) = tokio::signal::ctrl_c().await {
        eprintln!("Failed to wait for shutdown signal: {}", e);
    }

    audio_feed.abort();
    video_feed.abort();
    relay.shutdown().await;
}
