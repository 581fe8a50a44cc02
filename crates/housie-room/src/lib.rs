//! Rooms for the Housie engine.
//!
//! Each room runs as an isolated Tokio task (actor model) that owns the
//! room's state and applies one mutation at a time. A single notifier task
//! fans the resulting publications out in order.
//!
//! # Key types
//!
//! - [`RoomRegistry`]: creates rooms and routes every operation
//! - [`RoomHandle`]: send commands to a running room actor
//! - [`Room`]: the synchronous state machine the actor owns
//! - [`ClaimRequest`] / [`ClaimOutcome`]: claim validation in and out
//! - [`PrizePools`]: the five-way prize split
//! - [`Publisher`] / [`BroadcastPublisher`]: where publications go
//! - [`RoomConfig`]: ticket limits, default names, queue sizes

mod claim;
mod config;
mod error;
mod manager;
mod notifier;
mod prize;
mod room;
mod state;

pub use claim::{ClaimOutcome, ClaimRequest, winning_number};
pub use config::RoomConfig;
pub use error::RoomError;
pub use manager::{CODE_ALPHABET, CODE_LEN, RoomRegistry, SharedRegistry, random_code};
pub use notifier::{
    BroadcastPublisher, PublicationSender, PublishError, Publisher, spawn_notifier,
};
pub use prize::{
    Payout, PrizePools, payouts, prize_per_winner, prize_pools, room_prize_pools,
};
pub use room::RoomHandle;
pub use state::Room;
