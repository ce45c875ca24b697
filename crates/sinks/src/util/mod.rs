//! Sink utilities

mod rate_limited_logger;

pub use rate_limited_logger::{DEFAULT_LOG_INTERVAL, MAX_DETAIL_LOG_LENGTH, RateLimitedLogger};
