//! Optional per-role audio segment dump
//!
//! Off by default. When a segment directory is configured, routed audio
//! accumulates in a per-role buffer and is flushed to a timestamped raw
//! file once the buffer reaches the threshold. The live broadcast path
//! never depends on this; a write failure only loses the segment.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{Error, Result};
use crate::media::audio::AudioSource;

/// Capture SDK delivers 32 kHz mono 16-bit audio
const SAMPLE_RATE: usize = 32_000;
const BYTES_PER_SAMPLE: usize = 2;

/// Default flush threshold: 3 seconds of audio
pub const DEFAULT_SEGMENT_THRESHOLD: usize = SAMPLE_RATE * BYTES_PER_SAMPLE * 3;

/// Accumulates per-role audio and writes timestamped segment files
#[derive(Debug)]
pub struct SegmentWriter {
    dir: PathBuf,
    threshold: usize,
    host_buffer: Mutex<Vec<u8>>,
    client_buffer: Mutex<Vec<u8>>,
}

impl SegmentWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            threshold: DEFAULT_SEGMENT_THRESHOLD,
            host_buffer: Mutex::new(Vec::new()),
            client_buffer: Mutex::new(Vec::new()),
        }
    }

    /// Override the flush threshold in bytes
    pub fn with_threshold(mut self, bytes: usize) -> Self {
        self.threshold = bytes;
        self
    }

    /// Append one payload; returns the segment path if a flush happened
    pub fn append(&self, source: AudioSource, payload: &[u8]) -> Result<Option<PathBuf>> {
        let buffer = match source {
            AudioSource::Host => &self.host_buffer,
            AudioSource::Client => &self.client_buffer,
        };

        let pending = {
            let mut buffer = buffer.lock().unwrap();
            buffer.extend_from_slice(payload);
            if buffer.len() < self.threshold {
                return Ok(None);
            }
            std::mem::take(&mut *buffer)
        };

        self.flush(source, &pending).map(Some)
    }

    fn flush(&self, source: AudioSource, data: &[u8]) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir).map_err(Error::SegmentWrite)?;

        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        let path = self.dir.join(format!("{}_{}.raw", source.as_str(), millis));

        std::fs::write(&path, data).map_err(Error::SegmentWrite)?;
        tracing::info!(
            path = %path.display(),
            bytes = data.len(),
            source = source.as_str(),
            "Saved audio segment"
        );
        Ok(path)
    }

    /// Directory segments are written to
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}
