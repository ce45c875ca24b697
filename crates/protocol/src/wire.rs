//! Remote-write wire codec
//!
//! Encodes and decodes `snappy_block(protobuf(WriteRequest))` payloads as sent
//! by Prometheus remote-write clients.

use prost::Message;

use crate::batch::Batch;
use crate::error::ProtocolError;
use crate::series::Series;
use crate::Result;

/// Remote-write request envelope
///
/// Metadata (tag 3) is not modelled; prost skips unknown fields on decode.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct WriteRequest {
    #[prost(message, repeated, tag = "1")]
    pub timeseries: Vec<Series>,
}

/// Encode series into a compressed remote-write body
///
/// # Errors
///
/// Returns `ProtocolError::Compress` if snappy fails (only on oversized input).
pub fn encode_write_request(series: &[Series]) -> Result<Vec<u8>> {
    let request = WriteRequest {
        timeseries: series.to_vec(),
    };
    let raw = request.encode_to_vec();
    snap::raw::Encoder::new()
        .compress_vec(&raw)
        .map_err(ProtocolError::Compress)
}

/// Decode a compressed remote-write body into a batch
///
/// `max_size` bounds the decompressed length; the snappy block header declares
/// it up front, so oversized payloads are rejected before allocation.
///
/// # Errors
///
/// Returns an error for empty input, oversized payloads, invalid snappy
/// framing or invalid protobuf.
pub fn decode_write_request(body: &[u8], max_size: usize) -> Result<Batch> {
    if body.is_empty() {
        return Err(ProtocolError::EmptyPayload);
    }

    let decoded_len = snap::raw::decompress_len(body).map_err(ProtocolError::Decompress)?;
    if decoded_len > max_size {
        return Err(ProtocolError::too_large(decoded_len, max_size));
    }

    let raw = snap::raw::Decoder::new()
        .decompress_vec(body)
        .map_err(ProtocolError::Decompress)?;
    let request = WriteRequest::decode(raw.as_slice())?;

    Ok(Batch::new(request.timeseries))
}
