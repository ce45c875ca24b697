//! Front door error types

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use sroute_pipeline::PipelineError;
use sroute_protocol::ProtocolError;
use thiserror::Error;

/// Reasons a write request is rejected
#[derive(Debug, Error)]
pub enum ReceiveError {
    /// Body could not be read (includes the size limit)
    #[error("failed to read body: {message}")]
    Body { status: StatusCode, message: String },

    /// Payload is not valid snappy + protobuf
    #[error(transparent)]
    Decode(#[from] ProtocolError),

    /// Request carried no series
    #[error("write request contains no series")]
    Empty,

    /// The router refused the batch
    #[error(transparent)]
    Dispatch(#[from] PipelineError),
}

impl ReceiveError {
    /// HTTP status for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Body { status, .. } => *status,
            Self::Decode(ProtocolError::PayloadTooLarge { .. }) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Decode(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            Self::Decode(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Empty => StatusCode::BAD_REQUEST,
            Self::Dispatch(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Value of the `reason` label on `receive_rejected_total`
    pub fn reason(&self) -> &'static str {
        match self.status_code() {
            StatusCode::PAYLOAD_TOO_LARGE => "too_large",
            _ => match self {
                Self::Body { .. } => "body",
                Self::Decode(_) => "decode",
                Self::Empty => "empty",
                Self::Dispatch(PipelineError::NoRoutes) => "no_routes",
                Self::Dispatch(_) => "dispatch",
            },
        }
    }
}

/// Error body
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl IntoResponse for ReceiveError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.reason(),
            message: self.to_string(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_and_reason() {
        let err = ReceiveError::Decode(ProtocolError::too_large(10, 5));
        assert_eq!(err.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(err.reason(), "too_large");

        let err = ReceiveError::Decode(ProtocolError::EmptyPayload);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.reason(), "decode");

        let err = ReceiveError::Body {
            status: StatusCode::PAYLOAD_TOO_LARGE,
            message: "length limit exceeded".into(),
        };
        assert_eq!(err.reason(), "too_large");

        assert_eq!(ReceiveError::Empty.status_code(), StatusCode::BAD_REQUEST);
        let err = ReceiveError::from(PipelineError::NoRoutes);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.reason(), "no_routes");
        assert_eq!(err.to_string(), "no routes configured");
    }
}
