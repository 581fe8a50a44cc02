//! Error types for the protocol layer.
//!
//! A `ProtocolError` always means the bytes or their shape were wrong,
//! never that a room rejected an action. Room rejections travel inside a
//! [`Reply::Error`](crate::Reply::Error).

/// Errors that can occur while encoding or decoding messages.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed.
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed: malformed JSON, a missing field, an unknown
    /// action tag, or a value of the wrong type.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The message decoded but is not valid at the protocol level.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
