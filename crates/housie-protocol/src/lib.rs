//! Wire protocol for the Housie engine.
//!
//! This crate defines what travels between the engine and its callers:
//!
//! - **Types** ([`RoomSnapshot`], [`ClaimType`], [`RoomStatus`], etc.):
//!   the room state every participant sees.
//! - **Messages** ([`Action`], [`Reply`], [`ClientMessage`],
//!   [`ServerMessage`]): the request/response surface and the envelopes
//!   a transport wraps them in.
//! - **Publications** ([`Publication`], [`StaleFilter`]): ordered room
//!   snapshots pushed after every mutation, and the consumer-side rule for
//!   discarding stale ones.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how messages become
//!   bytes.
//!
//! # Architecture
//!
//! ```text
//! Transport (bytes) → Protocol (ClientMessage) → Room registry (Action)
//! ```

mod codec;
mod error;
mod message;
mod publication;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use housie_ticket::Ticket;
pub use message::{
    Action, ClientMessage, ErrorKind, Reply, RequestHeader, ServerMessage,
};
pub use publication::{Publication, StaleFilter};
pub use types::{
    ClaimEntry, ClaimLedger, ClaimType, EndReason, Player, PlayerId,
    RoomCode, RoomSnapshot, RoomStatus,
};
