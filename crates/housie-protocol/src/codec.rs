//! Codec trait and implementations for serializing/deserializing messages.
//!
//! The protocol layer doesn't care how messages become bytes; it only
//! needs something that implements [`Codec`]. [`JsonCodec`] is the one
//! shipped today because browsers speak it natively.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Encodes Rust values to bytes and decodes bytes back.
///
/// `Send + Sync + 'static` because a single codec instance is shared by
/// every connection task for the lifetime of the server.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// incomplete, or don't match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] backed by `serde_json`.
///
/// Behind the `json` feature flag (enabled by default).
///
/// ## Example
///
/// ```rust
/// use housie_protocol::{Action, ClientMessage, Codec, JsonCodec, RoomCode};
///
/// let codec = JsonCodec;
/// let msg = ClientMessage::Request {
///     request_id: 7,
///     action: Action::GetRoom { code: RoomCode::new("ab2cd3") },
/// };
///
/// let bytes = codec.encode(&msg).unwrap();
/// let decoded: ClientMessage = codec.decode(&bytes).unwrap();
/// assert_eq!(msg, decoded);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::{ServerMessage, Reply};

    #[test]
    fn test_decode_garbage_is_decode_error() {
        let result: Result<ServerMessage, _> = JsonCodec.decode(b"not json");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_decode_unknown_action_is_decode_error() {
        let bytes = br#"{"type":"request","requestId":1,"action":{"action":"shuffle"}}"#;
        let result: Result<crate::ClientMessage, _> = JsonCodec.decode(bytes);
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_encode_response_uses_camel_case_tags() {
        let msg = ServerMessage::Response {
            request_id: 3,
            reply: Reply::Drawn { number: 42 },
        };
        let json = String::from_utf8(JsonCodec.encode(&msg).unwrap()).unwrap();
        assert!(json.contains(r#""type":"response""#));
        assert!(json.contains(r#""requestId":3"#));
        assert!(json.contains(r#""reply":"drawn""#));
        assert!(json.contains(r#""number":42"#));
    }
}
