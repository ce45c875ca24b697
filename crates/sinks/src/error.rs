//! Sink errors
//!
//! Delivery failures are split into recoverable (timeouts, 5xx, broker
//! leader churn) and permanent (4xx, encoding failures). Sinks never retry
//! recoverable HTTP failures themselves; the classification only feeds
//! counters and logs so transient faults can be told apart from
//! misconfiguration.

use std::time::Duration;

use thiserror::Error;

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;

/// Result type for sink operations
pub type Result<T> = std::result::Result<T, SinkError>;

/// Errors from building or driving a sink
#[derive(Debug, Error)]
pub enum SinkError {
    /// Transient delivery failure
    #[error("recoverable error from {endpoint}{}: {message}", status_suffix(.status))]
    Recoverable {
        endpoint: String,
        status: Option<u16>,
        message: String,
        /// Suggested wait before another attempt; zero leaves it to the caller
        retry_after: Duration,
    },

    /// Delivery failure that a retry would not fix
    #[error("permanent error from {endpoint}{}: {message}", status_suffix(.status))]
    Permanent {
        endpoint: String,
        status: Option<u16>,
        message: String,
    },

    /// A record could not be encoded
    #[error("serialization failed: {0}")]
    Serialize(String),

    /// Every publish attempt for one topic failed
    #[error("publish to {topic} failed after {attempts} attempt(s): {last_error}")]
    RetriesExhausted {
        topic: String,
        attempts: u32,
        last_error: String,
    },

    /// Some topics of a batch could not be published
    #[error("{failed} of {total} topic batch(es) failed: {last_error}")]
    PartialPublish {
        failed: usize,
        total: usize,
        last_error: String,
    },

    /// The sink could not be constructed from its configuration
    #[error("failed to build {kind} sink for route {route}: {message}")]
    Build {
        kind: &'static str,
        route: String,
        message: String,
    },
}

fn status_suffix(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!(" (status {})", code),
        None => String::new(),
    }
}

impl SinkError {
    /// Recoverable failure with no retry hint
    pub fn recoverable(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Recoverable {
            endpoint: endpoint.into(),
            status: None,
            message: message.into(),
            retry_after: Duration::ZERO,
        }
    }

    /// Recoverable failure carrying the HTTP status and retry hint
    pub fn recoverable_status(
        endpoint: impl Into<String>,
        status: u16,
        message: impl Into<String>,
        retry_after: Duration,
    ) -> Self {
        Self::Recoverable {
            endpoint: endpoint.into(),
            status: Some(status),
            message: message.into(),
            retry_after,
        }
    }

    /// Permanent failure
    pub fn permanent(
        endpoint: impl Into<String>,
        status: Option<u16>,
        message: impl Into<String>,
    ) -> Self {
        Self::Permanent {
            endpoint: endpoint.into(),
            status,
            message: message.into(),
        }
    }

    /// Route build failure
    pub fn build(kind: &'static str, route: impl Into<String>, message: impl ToString) -> Self {
        Self::Build {
            kind,
            route: route.into(),
            message: message.to_string(),
        }
    }

    /// Whether the failure is transient
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable { .. })
    }

    /// Suggested wait before retrying, only for recoverable errors
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::Recoverable { retry_after, .. } => Some(*retry_after),
            _ => None,
        }
    }

    /// HTTP status attached to the failure, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Recoverable { status, .. } | Self::Permanent { status, .. } => *status,
            _ => None,
        }
    }
}
