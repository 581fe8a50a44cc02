//! Error types for the room layer.

use housie_protocol::{ErrorKind, Reply, RoomCode};

/// Why a room rejected an action.
///
/// Every variant is recoverable. Validation runs before any mutation, so a
/// rejected action leaves the room exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoomError {
    /// Room, player, or ticket absent.
    #[error("{0}")]
    NotFound(String),

    /// A non-host invoked a host-only action.
    #[error("{0}")]
    Unauthorized(String),

    /// The action is not valid in the room's current status.
    #[error("{0}")]
    InvalidState(String),

    /// Bad counts, wrong-length claim sets, undrawn numbers.
    #[error("{0}")]
    InvalidInput(String),

    /// All 90 numbers have been drawn.
    #[error("All numbers have been drawn")]
    Exhausted,

    /// The room's command channel is closed.
    #[error("room {0} is unavailable")]
    Unavailable(RoomCode),
}

impl RoomError {
    pub(crate) fn room_not_found() -> Self {
        Self::NotFound("Room not found".into())
    }

    pub(crate) fn not_host() -> Self {
        Self::Unauthorized("Only the host can do that".into())
    }

    /// The wire category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Unauthorized(_) => ErrorKind::Unauthorized,
            Self::InvalidState(_) => ErrorKind::InvalidState,
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::Exhausted => ErrorKind::Exhausted,
            Self::Unavailable(_) => ErrorKind::Unavailable,
        }
    }
}

impl From<RoomError> for Reply {
    fn from(err: RoomError) -> Self {
        Reply::Error {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}
