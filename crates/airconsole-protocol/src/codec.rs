//! Codec trait and implementations for serializing/deserializing messages.
//!
//! The host frame speaks JSON today, but nothing above this module needs
//! to know that: the client is generic over [`Codec`].

use serde::{de::DeserializeOwned, Serialize};

use crate::ProtocolError;

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// `DeserializeOwned` (vs plain `Deserialize`) means the decoded value
/// owns its data, so the inbound buffer can be dropped right after.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed or don't
    /// match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`), matching what the host
/// frame posts.
///
/// ## Example
///
/// ```rust
/// use airconsole_protocol::{Codec, DeviceId, InboundEvent, JsonCodec};
///
/// let codec = JsonCodec;
/// let bytes = br#"{"action":"premium","device_id":3}"#;
///
/// let event: InboundEvent = codec.decode(bytes).unwrap();
/// assert_eq!(event, InboundEvent::Premium { device_id: DeviceId(3) });
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DeviceId, OutboundCommand};

    #[test]
    fn test_json_codec_encodes_outbound_command() {
        let cmd = OutboundCommand::Message {
            to: Some(DeviceId(2)),
            data: serde_json::json!({"hit": true}),
        };

        let bytes = JsonCodec.encode(&cmd).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(json["action"], "message");
        assert_eq!(json["to"], 2);
        assert_eq!(json["data"]["hit"], true);
    }

    #[test]
    fn test_json_codec_decode_garbage_returns_decode_error() {
        let result: Result<OutboundCommand, _> = JsonCodec.decode(b"not json");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }
}
