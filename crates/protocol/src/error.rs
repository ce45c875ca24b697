//! Protocol error types
//!
//! Errors that can occur when encoding or decoding remote-write payloads.

use thiserror::Error;

/// Errors that can occur during protocol operations
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Snappy block decompression failed
    #[error("snappy decode failed: {0}")]
    Decompress(#[source] snap::Error),

    /// Snappy block compression failed
    #[error("snappy encode failed: {0}")]
    Compress(#[source] snap::Error),

    /// Protobuf payload could not be decoded
    #[error("invalid protobuf payload: {0}")]
    Decode(#[from] prost::DecodeError),

    /// Payload exceeds the configured maximum size
    #[error("payload size {size} exceeds maximum {max}")]
    PayloadTooLarge { size: usize, max: usize },

    /// Payload was empty
    #[error("empty payload")]
    EmptyPayload,
}

impl ProtocolError {
    /// Create a payload too large error
    #[inline]
    pub fn too_large(size: usize, max: usize) -> Self {
        Self::PayloadTooLarge { size, max }
    }

    /// Whether the error was caused by malformed client input
    ///
    /// Client errors map to HTTP 400/413 at the front door.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::Compress(_))
    }
}
