//! Single-endpoint remote-write client
//!
//! Encodes a shard's series as a snappy-compressed `WriteRequest` and POSTs
//! it. Responses are classified, never retried here:
//!
//! | Outcome                         | Error         |
//! |---------------------------------|---------------|
//! | 2xx                             | none          |
//! | transport error, timeout, 5xx   | `Recoverable` |
//! | any other status                | `Permanent`   |

use std::time::Duration;

use reqwest::header::{CONTENT_ENCODING, CONTENT_TYPE, HeaderMap, RETRY_AFTER};
use reqwest::{Client, Response, StatusCode};
use sroute_protocol::{REMOTE_WRITE_VERSION, Series, encode_write_request};

use crate::{Result, SinkError};

/// Request timeout used when the config leaves it unset
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Longest slice of an error response body kept in the error message
pub const MAX_ERROR_BODY_LENGTH: usize = 1024;

/// Protocol version header
pub const REMOTE_WRITE_VERSION_HEADER: &str = "X-Prometheus-Remote-Write-Version";

/// `User-Agent` sent with every request
pub fn user_agent() -> String {
    format!("sroute/{}", env!("CARGO_PKG_VERSION"))
}

/// Remote-write client bound to one endpoint URL
#[derive(Debug, Clone)]
pub struct EndpointWriter {
    url: String,
    client: Client,
}

impl EndpointWriter {
    /// Create a writer with its own HTTP client
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let url = url.into();
        let timeout = if timeout.is_zero() {
            DEFAULT_TIMEOUT
        } else {
            timeout
        };
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent())
            .build()
            .map_err(|e| SinkError::build("remote_write", url.clone(), e))?;
        Ok(Self { url, client })
    }

    /// Endpoint URL
    #[inline]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Encode and send `series`
    pub async fn write(&self, series: &[Series]) -> Result<()> {
        let body = encode_write_request(series)
            .map_err(|e| SinkError::permanent(&self.url, None, e.to_string()))?;

        let response = self
            .client
            .post(&self.url)
            .header(CONTENT_ENCODING, "snappy")
            .header(CONTENT_TYPE, "application/x-protobuf")
            .header(REMOTE_WRITE_VERSION_HEADER, REMOTE_WRITE_VERSION)
            .body(body)
            .send()
            .await
            .map_err(|e| SinkError::recoverable(&self.url, e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let retry_after = parse_retry_after(response.headers());
        let body = read_error_prefix(response).await;
        let message = first_line(&body);
        Err(classify_status(&self.url, status, message, retry_after))
    }
}

/// Map a non-2xx status to the error class
pub(crate) fn classify_status(
    endpoint: &str,
    status: StatusCode,
    message: &str,
    retry_after: Duration,
) -> SinkError {
    if status.is_server_error() {
        SinkError::recoverable_status(endpoint, status.as_u16(), message, retry_after)
    } else {
        SinkError::permanent(endpoint, Some(status.as_u16()), message)
    }
}

/// First line of `body`, at most `MAX_ERROR_BODY_LENGTH` bytes
pub(crate) fn first_line(body: &str) -> &str {
    let line = body.lines().next().unwrap_or("");
    if line.len() <= MAX_ERROR_BODY_LENGTH {
        return line;
    }
    let mut end = MAX_ERROR_BODY_LENGTH;
    while !line.is_char_boundary(end) {
        end -= 1;
    }
    &line[..end]
}

/// Leading bytes of an error body, up to the first newline or
/// `MAX_ERROR_BODY_LENGTH` bytes; the rest of the body is never read
async fn read_error_prefix(mut response: Response) -> String {
    let mut prefix = Vec::new();
    while prefix.len() < MAX_ERROR_BODY_LENGTH && !prefix.contains(&b'\n') {
        match response.chunk().await {
            Ok(Some(chunk)) => {
                let take = chunk.len().min(MAX_ERROR_BODY_LENGTH - prefix.len());
                prefix.extend_from_slice(&chunk[..take]);
            }
            Ok(None) | Err(_) => break,
        }
    }
    String::from_utf8_lossy(&prefix).into_owned()
}

/// `Retry-After` in delay-seconds form; zero when absent or a date
fn parse_retry_after(headers: &HeaderMap) -> Duration {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map_or(Duration::ZERO, Duration::from_secs)
}
