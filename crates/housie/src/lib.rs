//! # Housie
//!
//! Authoritative server for Tambola/Housie rooms.
//!
//! The engine generates tickets, runs the shared draw, validates and
//! records claims, splits the prize pool, and publishes an ordered snapshot
//! after every change. This crate puts a WebSocket front end on top:
//! clients send [`ClientMessage`](housie_protocol::ClientMessage) requests
//! and subscribe to rooms to receive publications.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use housie::prelude::*;
//!
//! # async fn run() -> Result<(), HousieError> {
//! let server = HousieServer::builder().bind("0.0.0.0:8080").build().await?;
//! server.run().await
//! # }
//! ```

mod error;
mod handler;
mod server;

pub use error::HousieError;
pub use handler::execute;
pub use server::{HousieServer, HousieServerBuilder};

/// Everything needed to run a server or drive rooms directly.
pub mod prelude {
    pub use crate::{HousieError, HousieServer, HousieServerBuilder, execute};
    pub use housie_protocol::{
        Action, ClaimEntry, ClaimType, ClientMessage, Codec, ErrorKind, JsonCodec,
        Player, PlayerId, Publication, Reply, RoomCode, RoomSnapshot, RoomStatus,
        ServerMessage, StaleFilter, Ticket,
    };
    pub use housie_room::{
        BroadcastPublisher, ClaimOutcome, ClaimRequest, PrizePools, PublishError,
        Publisher, RoomConfig, RoomError, RoomRegistry, payouts, prize_per_winner,
        prize_pools,
    };
    pub use housie_ticket::{TicketBatch, Uniqueness, generate_tickets};
}
