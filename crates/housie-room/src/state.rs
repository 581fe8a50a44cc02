//! The room aggregate: one room's full state and every rule that guards it.
//!
//! `Room` is plain synchronous data. The actor in [`crate::room`] owns one
//! and serializes access; nothing here knows about tasks or channels.
//! Each successful mutation bumps `seq` exactly once, and every check runs
//! before anything is written.

use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use housie_protocol::{
    ClaimEntry, ClaimLedger, ClaimType, EndReason, Player, PlayerId, RoomCode,
    RoomSnapshot, RoomStatus, Ticket,
};
use housie_ticket::{HIGHEST_NUMBER, TicketBatch};
use rand::Rng;
use rand::rngs::StdRng;

use crate::claim::{self, ClaimOutcome, ClaimRequest};
use crate::{RoomConfig, RoomError};

/// Unix epoch milliseconds.
pub(crate) fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// A fresh 128-bit identifier as 32 lowercase hex characters.
pub(crate) fn random_id<R: Rng>(rng: &mut R) -> String {
    let bytes: [u8; 16] = rng.random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn trimmed_or(name: &str, default: &str) -> String {
    let name = name.trim();
    if name.is_empty() {
        default.to_string()
    } else {
        name.to_string()
    }
}

/// One room's authoritative state.
pub struct Room {
    code: RoomCode,
    ticket_price: u64,
    host_id: PlayerId,
    players: Vec<Player>,
    status: RoomStatus,
    end_reason: Option<EndReason>,
    created_at: u64,
    seq: u64,
    drawn: Vec<u8>,
    tickets: BTreeMap<PlayerId, Vec<Ticket>>,
    claims: ClaimLedger,
    fallbacks: Vec<PlayerId>,
    config: RoomConfig,
    rng: StdRng,
}

impl Room {
    /// Creates a waiting room with the host as its only player.
    ///
    /// The new room is already at `seq` 1: creation counts as its first
    /// published mutation.
    pub fn new(
        code: RoomCode,
        ticket_price: u64,
        host_name: &str,
        host_ticket_count: i64,
        config: RoomConfig,
        mut rng: StdRng,
    ) -> Self {
        let host_id = PlayerId(random_id(&mut rng));
        let created_at = now_millis();
        let host = Player {
            id: host_id.clone(),
            name: trimmed_or(host_name, &config.default_host_name),
            ticket_count: config.clamp_host_tickets(host_ticket_count),
            joined_at: created_at,
        };
        Self {
            code,
            ticket_price,
            host_id,
            players: vec![host],
            status: RoomStatus::Waiting,
            end_reason: None,
            created_at,
            seq: 1,
            drawn: Vec::new(),
            tickets: BTreeMap::new(),
            claims: ClaimLedger::default(),
            fallbacks: Vec::new(),
            config,
            rng,
        }
    }

    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    pub fn host_id(&self) -> &PlayerId {
        &self.host_id
    }

    pub fn status(&self) -> RoomStatus {
        self.status
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn drawn_numbers(&self) -> &[u8] {
        &self.drawn
    }

    fn bump(&mut self) {
        self.seq += 1;
    }

    fn require_host(&self, caller: &PlayerId) -> Result<(), RoomError> {
        if caller == &self.host_id {
            Ok(())
        } else {
            Err(RoomError::not_host())
        }
    }

    fn require_waiting(&self, what: &str) -> Result<(), RoomError> {
        if self.status.is_joinable() {
            Ok(())
        } else {
            Err(RoomError::InvalidState(format!(
                "Cannot {what}: game is {}",
                self.status
            )))
        }
    }

    fn player_mut(&mut self, id: &PlayerId) -> Result<&mut Player, RoomError> {
        self.players
            .iter_mut()
            .find(|p| &p.id == id)
            .ok_or_else(|| RoomError::NotFound("Player not found".into()))
    }

    // -- Membership (waiting only) ------------------------------------------

    /// Adds a player and returns their new id.
    pub fn join(&mut self, name: &str, ticket_count: i64) -> Result<PlayerId, RoomError> {
        self.require_waiting("join")?;

        let id = loop {
            let candidate = PlayerId(random_id(&mut self.rng));
            if !self.players.iter().any(|p| p.id == candidate) {
                break candidate;
            }
        };
        self.players.push(Player {
            id: id.clone(),
            name: trimmed_or(name, &self.config.default_player_name),
            ticket_count: self.config.clamp_player_tickets(ticket_count),
            joined_at: now_millis(),
        });
        self.bump();

        tracing::info!(code = %self.code, player_id = %id, players = self.players.len(), "player joined");
        Ok(id)
    }

    /// Removes a non-host player.
    pub fn leave(&mut self, player_id: &PlayerId) -> Result<(), RoomError> {
        self.require_waiting("leave")?;
        if player_id == &self.host_id {
            return Err(RoomError::InvalidInput(
                "The host cannot leave; end the room instead".into(),
            ));
        }
        let index = self
            .players
            .iter()
            .position(|p| &p.id == player_id)
            .ok_or_else(|| RoomError::NotFound("Player not found".into()))?;

        self.players.remove(index);
        self.bump();

        tracing::info!(code = %self.code, %player_id, players = self.players.len(), "player left");
        Ok(())
    }

    /// Changes a player's ticket count before the game starts.
    pub fn update_tickets(&mut self, player_id: &PlayerId, ticket_count: i64) -> Result<(), RoomError> {
        self.require_waiting("change tickets")?;
        let count = if player_id == &self.host_id {
            self.config.clamp_host_tickets(ticket_count)
        } else {
            self.config.clamp_player_tickets(ticket_count)
        };
        self.player_mut(player_id)?.ticket_count = count;
        self.bump();

        tracing::debug!(code = %self.code, %player_id, ticket_count = count, "ticket count updated");
        Ok(())
    }

    // -- Lifecycle ----------------------------------------------------------

    /// Deals every player's tickets and opens the draw.
    pub fn start(&mut self, caller: &PlayerId) -> Result<(), RoomError> {
        self.start_with(caller, |rng, count| housie_ticket::generate_tickets_with(rng, count))
    }

    fn start_with<F>(&mut self, caller: &PlayerId, mut deal: F) -> Result<(), RoomError>
    where
        F: FnMut(&mut StdRng, usize) -> TicketBatch,
    {
        self.require_host(caller)?;
        self.require_waiting("start")?;

        let mut tickets = BTreeMap::new();
        let mut fallbacks = Vec::new();
        for player in &self.players {
            if player.ticket_count == 0 {
                tickets.insert(player.id.clone(), Vec::new());
                continue;
            }
            let batch = deal(&mut self.rng, usize::from(player.ticket_count));
            if batch.is_degraded() {
                tracing::warn!(
                    code = %self.code,
                    player_id = %player.id,
                    count = player.ticket_count,
                    "ticket batch degraded, numbers may repeat across this player's tickets"
                );
                fallbacks.push(player.id.clone());
            }
            tickets.insert(player.id.clone(), batch.tickets);
        }

        self.tickets = tickets;
        self.fallbacks = fallbacks;
        self.drawn.clear();
        self.claims = ClaimLedger::default();
        self.status = RoomStatus::Started;
        self.bump();

        tracing::info!(
            code = %self.code,
            players = self.players.len(),
            tickets = self.total_tickets(),
            "game started"
        );
        Ok(())
    }

    /// Draws one uniformly random number not drawn yet.
    pub fn draw(&mut self, caller: &PlayerId) -> Result<u8, RoomError> {
        self.require_host(caller)?;
        if !self.status.is_active() {
            return Err(RoomError::InvalidState(format!(
                "Cannot draw: game is {}",
                self.status
            )));
        }

        let remaining: Vec<u8> = (1..=HIGHEST_NUMBER)
            .filter(|n| !self.drawn.contains(n))
            .collect();
        if remaining.is_empty() {
            return Err(RoomError::Exhausted);
        }
        let number = remaining[self.rng.random_range(0..remaining.len())];
        self.drawn.push(number);
        self.bump();

        tracing::debug!(code = %self.code, number, draws = self.drawn.len(), "number drawn");
        Ok(number)
    }

    /// Closes the room. Allowed any time before it has ended.
    pub fn end(&mut self, caller: &PlayerId) -> Result<(), RoomError> {
        self.require_host(caller)?;
        if self.status.is_over() {
            return Err(RoomError::InvalidState("Game has already ended".into()));
        }
        self.finish(EndReason::Host);
        self.bump();
        Ok(())
    }

    fn finish(&mut self, reason: EndReason) {
        if self.status.can_transition_to(RoomStatus::Ended) {
            self.status = RoomStatus::Ended;
            self.end_reason = Some(reason);
            tracing::info!(code = %self.code, ?reason, draws = self.drawn.len(), "game ended");
        }
    }

    // -- Claims -------------------------------------------------------------

    /// Validates and records a claim.
    ///
    /// After a housie ends the room, another housie on the same final draw
    /// is still accepted so simultaneous winners share the prize. Other
    /// types bundled with that late housie are dropped.
    pub fn claim(&mut self, request: ClaimRequest) -> Result<ClaimOutcome, RoomError> {
        let tie_window = self.status.is_over() && self.end_reason == Some(EndReason::Housie);
        match self.status {
            RoomStatus::Waiting => {
                return Err(RoomError::InvalidState("Game has not started".into()));
            }
            RoomStatus::Ended if !tie_window => {
                return Err(RoomError::InvalidState("Game has ended".into()));
            }
            _ => {}
        }
        if request.claim_types.is_empty() {
            return Err(RoomError::InvalidInput("No claim types given".into()));
        }

        let registered_name = self
            .players
            .iter()
            .find(|p| p.id == request.player_id)
            .map(|p| p.name.clone())
            .ok_or_else(|| RoomError::NotFound("Player not found".into()))?;
        let ticket = self
            .tickets
            .get(&request.player_id)
            .and_then(|t| t.get(request.ticket_index))
            .ok_or_else(|| RoomError::NotFound("Ticket not found".into()))?;

        let mut verified = claim::verify(&request, ticket, &self.drawn, &self.claims)?;

        if tie_window {
            let last = self.drawn.last().copied();
            verified.retain(|v| v.claim_type == ClaimType::Housie && Some(v.winning_number) == last);
            if verified.is_empty() {
                return Err(RoomError::InvalidState("Game has ended".into()));
            }
        }
        if verified.is_empty() {
            return Err(RoomError::InvalidInput("No valid claims".into()));
        }

        let player_name = trimmed_or(&request.player_name, &registered_name);
        for v in &verified {
            self.claims.record(
                v.claim_type,
                ClaimEntry {
                    player_id: request.player_id.clone(),
                    player_name: player_name.clone(),
                    winning_number: v.winning_number,
                },
            );
            tracing::info!(
                code = %self.code,
                player_id = %request.player_id,
                claim = %v.claim_type,
                winning_number = v.winning_number,
                "claim recorded"
            );
        }
        if verified.iter().any(|v| v.claim_type == ClaimType::Housie) {
            self.finish(EndReason::Housie);
        }
        self.bump();

        Ok(ClaimOutcome {
            recorded: verified.iter().map(|v| v.claim_type).collect(),
            ended: self.status.is_over(),
        })
    }

    // -- Reads --------------------------------------------------------------

    fn total_tickets(&self) -> u64 {
        self.players.iter().map(|p| u64::from(p.ticket_count)).sum()
    }

    /// A detached copy of the current state.
    pub fn snapshot(&self) -> RoomSnapshot {
        let total_tickets = self.total_tickets();
        RoomSnapshot {
            code: self.code.clone(),
            ticket_price: self.ticket_price,
            host_id: self.host_id.clone(),
            players: self.players.clone(),
            status: self.status,
            end_reason: self.end_reason,
            created_at: self.created_at,
            seq: self.seq,
            drawn_numbers: self.drawn.clone(),
            player_tickets: self.tickets.clone(),
            claims: self.claims.clone(),
            total_tickets,
            total_amount: total_tickets.saturating_mul(self.ticket_price),
            ticket_fallbacks: self.fallbacks.clone(),
        }
    }
}

#[cfg(test)]
impl Room {
    /// Appends a draw without going through the RNG.
    pub(crate) fn push_draw(&mut self, number: u8) {
        self.drawn.push(number);
    }

    /// Replaces a player's dealt tickets.
    pub(crate) fn deal(&mut self, player_id: &PlayerId, tickets: Vec<Ticket>) {
        self.tickets.insert(player_id.clone(), tickets);
    }
}
