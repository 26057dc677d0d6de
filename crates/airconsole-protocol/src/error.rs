//! Error types for the protocol layer.

/// Errors that can occur in the protocol layer.
///
/// Encoding and decoding failures keep the original `serde_json` error so
/// the message in logs points at the offending field.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust value into bytes).
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed: malformed JSON, an unknown `action`, or a
    /// payload with the wrong shape.
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),
}
