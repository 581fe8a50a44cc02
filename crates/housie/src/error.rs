//! Unified error type for the Housie server.

use housie_protocol::ProtocolError;
use housie_room::RoomError;
use housie_transport::TransportError;

/// Top-level error that wraps every crate-specific error.
///
/// The `#[from]` attributes let `?` convert sub-crate errors directly.
#[derive(Debug, thiserror::Error)]
pub enum HousieError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, invalid message).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A room rejected an action.
    #[error(transparent)]
    Room(#[from] RoomError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::SendFailed(std::io::Error::other("gone"));
        let housie_err: HousieError = err.into();
        assert!(matches!(housie_err, HousieError::Transport(_)));
        assert!(housie_err.to_string().contains("gone"));
    }

    #[test]
    fn test_from_protocol_error() {
        let err = ProtocolError::InvalidMessage("bad".into());
        let housie_err: HousieError = err.into();
        assert!(matches!(housie_err, HousieError::Protocol(_)));
    }

    #[test]
    fn test_from_room_error() {
        let housie_err: HousieError = RoomError::Exhausted.into();
        assert!(matches!(housie_err, HousieError::Room(_)));
        assert_eq!(housie_err.to_string(), "All numbers have been drawn");
    }
}
