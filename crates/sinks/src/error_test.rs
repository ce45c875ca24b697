//! Tests for sink errors

use super::*;

#[test]
fn test_recoverable_classification() {
    let err = SinkError::recoverable("http://a/write", "connection refused");
    assert!(err.is_recoverable());
    assert_eq!(err.retry_after(), Some(Duration::ZERO));
    assert_eq!(err.status(), None);
}

#[test]
fn test_recoverable_status_carries_hint() {
    let err = SinkError::recoverable_status("http://a/write", 503, "busy", Duration::from_secs(2));
    assert!(err.is_recoverable());
    assert_eq!(err.retry_after(), Some(Duration::from_secs(2)));
    assert_eq!(err.status(), Some(503));
    assert_eq!(
        err.to_string(),
        "recoverable error from http://a/write (status 503): busy"
    );
}

#[test]
fn test_permanent_is_not_recoverable() {
    let err = SinkError::permanent("http://a/write", Some(400), "bad labels");
    assert!(!err.is_recoverable());
    assert_eq!(err.retry_after(), None);
    assert_eq!(err.status(), Some(400));
    assert!(err.to_string().contains("permanent error from http://a/write (status 400)"));
}

#[test]
fn test_permanent_without_status_display() {
    let err = SinkError::permanent("http://a/write", None, "encode failed");
    assert_eq!(err.to_string(), "permanent error from http://a/write: encode failed");
}

#[test]
fn test_retries_exhausted_display() {
    let err = SinkError::RetriesExhausted {
        topic: "metrics-node".into(),
        attempts: 3,
        last_error: "leader not available".into(),
    };
    assert!(!err.is_recoverable());
    assert_eq!(
        err.to_string(),
        "publish to metrics-node failed after 3 attempt(s): leader not available"
    );
}

#[test]
fn test_build_error_display() {
    let err = SinkError::build("kafka", "to-kafka", "bad template");
    assert_eq!(
        err.to_string(),
        "failed to build kafka sink for route to-kafka: bad template"
    );
}
