//! Crate error types
//!
//! All fallible operations in this crate return [`Result`]. Failures stay
//! contained in the component that detects them: a bind failure leaves the
//! server in `Failed` state for the health monitor to repair, a dead
//! subscriber is dropped from the registry, and nothing here terminates
//! the hosting process.

use std::net::SocketAddr;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for broadcast server and media operations
#[derive(Debug)]
pub enum Error {
    /// Listener could not bind to its configured address
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },
    /// Broadcast attempted while the server is not in `Running` state
    NotRunning,
    /// A video plane length does not match the 4:2:0 layout for the
    /// declared dimensions
    PlaneSize {
        plane: &'static str,
        expected: usize,
        actual: usize,
    },
    /// Audio segment file could not be written
    SegmentWrite(std::io::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Bind { addr, source } => {
                write!(f, "failed to bind listener on {}: {}", addr, source)
            }
            Error::NotRunning => write!(f, "broadcast server is not running"),
            Error::PlaneSize {
                plane,
                expected,
                actual,
            } => write!(
                f,
                "{} plane has {} bytes, expected {}",
                plane, actual, expected
            ),
            Error::SegmentWrite(e) => write!(f, "failed to write audio segment: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Bind { source, .. } => Some(source),
            Error::SegmentWrite(e) => Some(e),
            _ => None,
        }
    }
}
