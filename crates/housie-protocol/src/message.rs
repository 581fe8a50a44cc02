//! Request/response messages and the envelopes a transport carries them in.
//!
//! Two layers:
//!
//! - [`Action`] / [`Reply`]: the transport-agnostic action surface. Every
//!   room operation is one `Action` variant; every outcome is one `Reply`.
//! - [`ClientMessage`] / [`ServerMessage`]: the envelopes used by the
//!   WebSocket front end. They add request correlation, subscriptions and
//!   keep-alive on top of the action surface.
//!
//! All JSON is camelCase and internally tagged, so a request looks like:
//!
//! ```json
//! { "type": "request", "requestId": 4,
//!   "action": { "action": "drawNumber", "code": "K7QX2M", "hostId": "…" } }
//! ```

use serde::{Deserialize, Serialize};

use crate::publication::Publication;
use crate::types::{ClaimType, PlayerId, RoomCode, RoomSnapshot};

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

/// One room operation.
///
/// Counts, prices and chosen numbers are signed on the wire so
/// out-of-range values can be clamped or rejected by the room instead of
/// failing to decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Action {
    CreateRoom {
        ticket_price: i64,
        #[serde(default)]
        host_ticket_count: i64,
        #[serde(default)]
        host_name: String,
    },
    JoinRoom {
        code: RoomCode,
        #[serde(default)]
        player_name: String,
        ticket_count: i64,
    },
    LeaveRoom {
        code: RoomCode,
        player_id: PlayerId,
    },
    StartGame {
        code: RoomCode,
        host_id: PlayerId,
    },
    DrawNumber {
        code: RoomCode,
        host_id: PlayerId,
    },
    Claim {
        code: RoomCode,
        player_id: PlayerId,
        #[serde(default)]
        player_name: String,
        ticket_index: usize,
        claim_types: Vec<ClaimType>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        jaldi_five_numbers: Option<Vec<i64>>,
    },
    EndRoom {
        code: RoomCode,
        host_id: PlayerId,
    },
    GetRoom {
        code: RoomCode,
    },
    UpdateTickets {
        code: RoomCode,
        player_id: PlayerId,
        ticket_count: i64,
    },
}

impl Action {
    /// The room this action targets, if it targets an existing one.
    pub fn code(&self) -> Option<&RoomCode> {
        match self {
            Self::CreateRoom { .. } => None,
            Self::JoinRoom { code, .. }
            | Self::LeaveRoom { code, .. }
            | Self::StartGame { code, .. }
            | Self::DrawNumber { code, .. }
            | Self::Claim { code, .. }
            | Self::EndRoom { code, .. }
            | Self::GetRoom { code }
            | Self::UpdateTickets { code, .. } => Some(code),
        }
    }

    /// The wire name of the action, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateRoom { .. } => "createRoom",
            Self::JoinRoom { .. } => "joinRoom",
            Self::LeaveRoom { .. } => "leaveRoom",
            Self::StartGame { .. } => "startGame",
            Self::DrawNumber { .. } => "drawNumber",
            Self::Claim { .. } => "claim",
            Self::EndRoom { .. } => "endRoom",
            Self::GetRoom { .. } => "getRoom",
            Self::UpdateTickets { .. } => "updateTickets",
        }
    }
}

// ---------------------------------------------------------------------------
// Reply
// ---------------------------------------------------------------------------

/// The category of a rejected action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    /// Room, player, or ticket absent.
    NotFound,
    /// A non-host invoked a host-only action.
    Unauthorized,
    /// The action is not valid in the room's current status.
    InvalidState,
    /// Malformed counts, wrong-length claim sets, undrawn numbers.
    InvalidInput,
    /// All 90 numbers have been drawn.
    Exhausted,
    /// The room's actor is gone.
    Unavailable,
}

/// The outcome of one [`Action`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reply", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Reply {
    Created {
        room_code: RoomCode,
        host_id: PlayerId,
        ticket_price: u64,
    },
    Joined {
        room: RoomSnapshot,
        player_id: PlayerId,
    },
    Ok,
    Drawn {
        number: u8,
    },
    Claimed {
        claim_types: Vec<ClaimType>,
        ended: bool,
    },
    Room {
        room: RoomSnapshot,
    },
    Error {
        kind: ErrorKind,
        message: String,
    },
}

impl Reply {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }
}

// ---------------------------------------------------------------------------
// Envelopes
// ---------------------------------------------------------------------------

/// Client → server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    /// Run an action. The reply echoes `request_id`.
    Request { request_id: u64, action: Action },
    /// Start receiving publications for a room.
    Subscribe { code: RoomCode },
    /// Stop receiving publications for a room.
    Unsubscribe { code: RoomCode },
    Ping,
}

/// Just the correlation id of a request frame.
///
/// Read on its own when a full [`ClientMessage`] fails to decode, so a
/// request with a malformed action can still be answered under its id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestHeader {
    pub request_id: u64,
}

/// Server → client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    Response { request_id: u64, reply: Reply },
    /// A room snapshot pushed after a mutation.
    Publication(Publication),
    Pong,
    /// The incoming frame could not be understood.
    Error { message: String },
}
