//! Room registry: creates rooms and routes operations to their actors.

use std::collections::HashMap;
use std::sync::Arc;

use housie_protocol::{PlayerId, RoomCode, RoomSnapshot};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::RwLock;

use crate::claim::{ClaimOutcome, ClaimRequest};
use crate::notifier::{PublicationSender, Publisher, spawn_notifier};
use crate::room::spawn_room;
use crate::state::Room;
use crate::{RoomConfig, RoomError, RoomHandle};

/// Room code alphabet: no `I`, `O`, `0` or `1`.
pub const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Length of a room code.
pub const CODE_LEN: usize = 6;

/// A random room code.
pub fn random_code<R: Rng>(rng: &mut R) -> RoomCode {
    let code: String = (0..CODE_LEN)
        .map(|_| char::from(CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())]))
        .collect();
    RoomCode::new(&code)
}

/// Every live room, keyed by code.
///
/// The map lock is held only to look up or insert a handle. Actor
/// round-trips happen after it is released, so rooms never wait on each
/// other.
pub struct RoomRegistry {
    rooms: RwLock<HashMap<RoomCode, RoomHandle>>,
    config: RoomConfig,
    outbound: PublicationSender,
}

impl RoomRegistry {
    /// Creates an empty registry that publishes into `outbound`.
    pub fn new(config: RoomConfig, outbound: PublicationSender) -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
            config,
            outbound,
        }
    }

    /// Creates a registry and spawns a notifier task feeding `publisher`.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn with_publisher<P: Publisher>(config: RoomConfig, publisher: P) -> Self {
        let (outbound, _task) = spawn_notifier(publisher, config.publish_timeout);
        Self::new(config, outbound)
    }

    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    async fn handle(&self, code: &RoomCode) -> Result<RoomHandle, RoomError> {
        self.rooms
            .read()
            .await
            .get(code)
            .cloned()
            .ok_or_else(RoomError::room_not_found)
    }

    /// Opens a new room with the caller as host.
    ///
    /// Returns the first snapshot and the host's id, which is the only
    /// credential for host actions.
    pub async fn create_room(
        &self,
        ticket_price: i64,
        host_ticket_count: i64,
        host_name: &str,
    ) -> Result<(RoomSnapshot, PlayerId), RoomError> {
        if ticket_price < 1 {
            return Err(RoomError::InvalidInput(
                "Ticket price must be at least 1".into(),
            ));
        }
        let ticket_price = ticket_price as u64;
        if ticket_price > self.config.max_ticket_price {
            return Err(RoomError::InvalidInput(format!(
                "Ticket price must be at most {}",
                self.config.max_ticket_price
            )));
        }

        let mut rng = StdRng::from_rng(&mut rand::rng());
        let mut rooms = self.rooms.write().await;
        let code = loop {
            let candidate = random_code(&mut rng);
            if !rooms.contains_key(&candidate) {
                break candidate;
            }
        };

        let room = Room::new(
            code.clone(),
            ticket_price,
            host_name,
            host_ticket_count,
            self.config.clone(),
            rng,
        );
        let host_id = room.host_id().clone();
        let handle = spawn_room(room, self.outbound.clone(), self.config.channel_size);
        let snapshot = handle.snapshot();
        rooms.insert(code.clone(), handle);

        tracing::info!(%code, ticket_price, rooms = rooms.len(), "room created");
        Ok((snapshot, host_id))
    }

    /// A copy of a room's latest state, or `None` if no such room.
    pub async fn get_room(&self, code: &RoomCode) -> Option<RoomSnapshot> {
        self.rooms.read().await.get(code).map(RoomHandle::snapshot)
    }

    pub async fn join_room(
        &self,
        code: &RoomCode,
        player_name: &str,
        ticket_count: i64,
    ) -> Result<(RoomSnapshot, PlayerId), RoomError> {
        self.handle(code)
            .await?
            .join(player_name.to_string(), ticket_count)
            .await
    }

    pub async fn leave_room(&self, code: &RoomCode, player_id: &PlayerId) -> Result<(), RoomError> {
        self.handle(code).await?.leave(player_id.clone()).await
    }

    pub async fn update_tickets(
        &self,
        code: &RoomCode,
        player_id: &PlayerId,
        ticket_count: i64,
    ) -> Result<(), RoomError> {
        self.handle(code)
            .await?
            .update_tickets(player_id.clone(), ticket_count)
            .await
    }

    pub async fn start_game(&self, code: &RoomCode, host_id: &PlayerId) -> Result<(), RoomError> {
        self.handle(code).await?.start(host_id.clone()).await
    }

    pub async fn draw_number(&self, code: &RoomCode, host_id: &PlayerId) -> Result<u8, RoomError> {
        self.handle(code).await?.draw(host_id.clone()).await
    }

    pub async fn claim(
        &self,
        code: &RoomCode,
        request: ClaimRequest,
    ) -> Result<ClaimOutcome, RoomError> {
        self.handle(code).await?.claim(request).await
    }

    pub async fn end_room(&self, code: &RoomCode, host_id: &PlayerId) -> Result<(), RoomError> {
        self.handle(code).await?.end(host_id.clone()).await
    }

    /// Number of rooms created in this process.
    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }
}

/// Shared registry, as handed to connection handlers.
pub type SharedRegistry = Arc<RoomRegistry>;
