//! Rate-limited warning logger
//!
//! Per-series failures (topic template errors, permanent delivery errors)
//! can repeat thousands of times per second. The logger emits at most one
//! line per interval and reports how many were suppressed in between.
//!
//! # Example
//!
//! ```ignore
//! use sroute_sinks::util::RateLimitedLogger;
//!
//! let logger = RateLimitedLogger::new("to-kafka", DEFAULT_LOG_INTERVAL);
//! logger.warn("topic template failed", &err);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Default interval between emitted lines
pub const DEFAULT_LOG_INTERVAL: Duration = Duration::from_secs(10);

/// Maximum length of the error detail included in a line
pub const MAX_DETAIL_LOG_LENGTH: usize = 1024;

/// Logs at most once per interval, counting what it swallowed
pub struct RateLimitedLogger {
    /// Route the messages belong to
    route: String,

    /// Minimum interval between log lines
    min_interval: Duration,

    /// Last time a line was emitted
    last_log_time: Mutex<Option<Instant>>,

    /// Events since the last emitted line
    pending: AtomicU64,

    /// Events ever recorded
    total: AtomicU64,
}

impl RateLimitedLogger {
    /// Create a logger for `route`
    pub fn new(route: impl Into<String>, min_interval: Duration) -> Self {
        Self {
            route: route.into(),
            min_interval,
            last_log_time: Mutex::new(None),
            pending: AtomicU64::new(0),
            total: AtomicU64::new(0),
        }
    }

    /// Record a warning; returns true if a line was emitted
    pub fn warn(&self, message: &str, error: &dyn std::fmt::Display) -> bool {
        let Some(suppressed) = self.record() else {
            return false;
        };
        let text = error.to_string();
        let detail = truncate_detail(&text);
        tracing::warn!(
            route = %self.route,
            error = %detail,
            suppressed,
            total = self.total.load(Ordering::Relaxed),
            "{}",
            message
        );
        true
    }

    /// Record an error; returns true if a line was emitted
    pub fn error(&self, message: &str, error: &dyn std::fmt::Display) -> bool {
        let Some(suppressed) = self.record() else {
            return false;
        };
        let text = error.to_string();
        let detail = truncate_detail(&text);
        tracing::error!(
            route = %self.route,
            error = %detail,
            suppressed,
            total = self.total.load(Ordering::Relaxed),
            "{}",
            message
        );
        true
    }

    /// Count one event; `Some(suppressed)` when a line should be emitted
    fn record(&self) -> Option<u64> {
        self.pending.fetch_add(1, Ordering::Relaxed);
        self.total.fetch_add(1, Ordering::Relaxed);

        let now = Instant::now();
        {
            let mut last = self.last_log_time.lock();
            match *last {
                Some(at) if now.duration_since(at) < self.min_interval => return None,
                _ => *last = Some(now),
            }
        }

        let count = self.pending.swap(0, Ordering::Relaxed);
        Some(count.saturating_sub(1))
    }

    /// Events recorded since the last emitted line
    pub fn pending_count(&self) -> u64 {
        self.pending.load(Ordering::Relaxed)
    }

    /// Events ever recorded
    pub fn total_count(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }
}

/// Cut `detail` to at most `MAX_DETAIL_LOG_LENGTH` bytes on a char boundary
fn truncate_detail(detail: &str) -> &str {
    if detail.len() <= MAX_DETAIL_LOG_LENGTH {
        return detail;
    }
    let mut end = MAX_DETAIL_LOG_LENGTH;
    while !detail.is_char_boundary(end) {
        end -= 1;
    }
    &detail[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_event_always_logs() {
        let logger = RateLimitedLogger::new("r", Duration::from_secs(10));
        assert!(logger.warn("template failed", &"boom"));
        assert_eq!(logger.total_count(), 1);
        assert_eq!(logger.pending_count(), 0);
    }

    #[test]
    fn test_rapid_events_suppressed() {
        let logger = RateLimitedLogger::new("r", Duration::from_secs(10));
        assert!(logger.warn("x", &"boom"));

        for _ in 0..10 {
            assert!(!logger.error("x", &"boom"));
        }

        assert_eq!(logger.total_count(), 11);
        assert_eq!(logger.pending_count(), 10);
    }

    #[test]
    fn test_logs_again_after_interval() {
        let logger = RateLimitedLogger::new("r", Duration::from_millis(10));
        assert!(logger.warn("x", &"boom"));
        assert!(!logger.warn("x", &"boom"));

        std::thread::sleep(Duration::from_millis(20));

        assert!(logger.warn("x", &"boom"));
        assert_eq!(logger.pending_count(), 0);
        assert_eq!(logger.total_count(), 3);
    }

    #[test]
    fn test_zero_interval_never_suppresses() {
        let logger = RateLimitedLogger::new("r", Duration::ZERO);
        for _ in 0..5 {
            assert!(logger.warn("x", &"boom"));
        }
    }

    #[test]
    fn test_owned_error_detail_is_logged() {
        let logger = RateLimitedLogger::new("r", Duration::ZERO);
        let error = crate::SinkError::Serialize("x".repeat(MAX_DETAIL_LOG_LENGTH * 2));
        assert!(logger.warn("serialization failed", &error));
        assert!(logger.error("serialization failed", &error));
        assert_eq!(logger.total_count(), 2);
    }

    #[test]
    fn test_truncate_detail() {
        let short = "short";
        assert_eq!(truncate_detail(short), short);

        let long = "é".repeat(MAX_DETAIL_LOG_LENGTH);
        let cut = truncate_detail(&long);
        assert!(cut.len() <= MAX_DETAIL_LOG_LENGTH);
        assert!(cut.chars().all(|c| c == 'é'));
    }
}
