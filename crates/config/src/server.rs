//! Front door HTTP server configuration

use serde::Deserialize;

/// Default listen address
pub const DEFAULT_LISTEN: &str = "0.0.0.0:8080";

/// Default request body cap: 32 MiB
pub const DEFAULT_MAX_BODY_SIZE: usize = 32 * 1024 * 1024;

/// Server configuration
///
/// ```toml
/// [server]
/// listen = "0.0.0.0:8080"
/// max_body_size = 33554432
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address for the remote-write receiver
    pub listen: String,

    /// Largest accepted body, compressed or decompressed (bytes)
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: DEFAULT_LISTEN.into(),
            max_body_size: DEFAULT_MAX_BODY_SIZE,
        }
    }
}
