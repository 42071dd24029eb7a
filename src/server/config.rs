//! Server configuration

use std::net::SocketAddr;

/// Default port for the audio broadcast service
pub const DEFAULT_AUDIO_PORT: u16 = 8180;

/// Default port for the video broadcast service
pub const DEFAULT_VIDEO_PORT: u16 = 8080;

/// Configuration for one broadcast service instance
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to
    pub bind_addr: SocketAddr,

    /// Enable TCP_NODELAY on accepted sockets (disable Nagle's algorithm)
    pub tcp_nodelay: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::audio()
    }
}

impl ServerConfig {
    /// Config for the audio broadcast service (port 8180)
    pub fn audio() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_AUDIO_PORT)),
            tcp_nodelay: true, // Important for low latency
        }
    }

    /// Config for the video broadcast service (port 8080)
    pub fn video() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_VIDEO_PORT)),
            ..Self::audio()
        }
    }

    /// Create a new config with custom bind address
    pub fn with_addr(addr: SocketAddr) -> Self {
        Self {
            bind_addr: addr,
            ..Default::default()
        }
    }

    /// Set the bind address
    pub fn bind(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Set TCP_NODELAY
    pub fn tcp_nodelay(mut self, enabled: bool) -> Self {
        self.tcp_nodelay = enabled;
        self
    }
}
