//! Publisher seam
//!
//! The queue sink talks to the broker through `Publisher`, and recreates it
//! through `Connector` when the connection becomes unusable. Tests plug in
//! in-memory implementations; production uses the Kafka ones.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

/// How a publish failure affects the retry loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Leader churn or timeouts: back off, then retry
    Transient,
    /// Connection-level failure: recreate the publisher, then retry
    Unknown,
    /// Anything else: stop retrying
    Fatal,
}

impl ErrorClass {
    /// Lowercase name for logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transient => "transient",
            Self::Unknown => "unknown",
            Self::Fatal => "fatal",
        }
    }
}

/// A failed publish attempt
#[derive(Debug, Clone, Error)]
#[error("{message} ({})", .class.as_str())]
pub struct PublishError {
    pub class: ErrorClass,
    pub message: String,
}

impl PublishError {
    /// Retryable after a backoff
    pub fn transient(message: impl Into<String>) -> Self {
        Self {
            class: ErrorClass::Transient,
            message: message.into(),
        }
    }

    /// Retryable after reconnecting
    pub fn unknown(message: impl Into<String>) -> Self {
        Self {
            class: ErrorClass::Unknown,
            message: message.into(),
        }
    }

    /// Not retryable
    pub fn fatal(message: impl Into<String>) -> Self {
        Self {
            class: ErrorClass::Fatal,
            message: message.into(),
        }
    }
}

/// Sends value-only messages to a topic
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Publish every payload to `topic`; fails if any message fails
    async fn publish(&self, topic: &str, payloads: &[Vec<u8>]) -> Result<(), PublishError>;
}

/// Creates publishers
pub trait Connector: Send + Sync {
    /// Create a fresh publisher
    fn connect(&self) -> Result<Arc<dyn Publisher>, PublishError>;
}
