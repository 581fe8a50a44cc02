//! Core room types shared by the engine and every consumer.
//!
//! Everything here is serialized in camelCase so a browser client can read
//! a snapshot without any mapping layer.

use std::collections::BTreeMap;
use std::fmt;

use housie_ticket::Ticket;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// An opaque per-room player identifier, issued at create/join time.
///
/// The host's id doubles as the credential for host-only actions, so it
/// is only ever returned to the caller that created the room.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl PlayerId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A room's join code, e.g. `"K7QX2M"`.
///
/// Codes are matched case-insensitively: construction trims surrounding
/// whitespace and upper-cases, so `" k7qx2m"` and `"K7QX2M"` are equal.
/// Deserialization goes through the same normalization.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct RoomCode(String);

impl RoomCode {
    /// Normalizes and wraps a code.
    pub fn new(code: &str) -> Self {
        Self(code.trim().to_ascii_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for RoomCode {
    fn from(s: String) -> Self {
        Self::new(&s)
    }
}

impl From<&str> for RoomCode {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<RoomCode> for String {
    fn from(code: RoomCode) -> Self {
        code.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// RoomStatus
// ---------------------------------------------------------------------------

/// The lifecycle state of a room.
///
/// Transitions only move forward:
///
/// ```text
/// Waiting → Started → Ended
///    └─────────────────↗
/// ```
///
/// - **Waiting**: accepting joins, leaves, and ticket-count changes.
/// - **Started**: tickets dealt; the host draws, players claim.
/// - **Ended**: host aborted or a housie was recorded. Terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    Waiting,
    Started,
    Ended,
}

impl RoomStatus {
    /// Returns `true` if players may still join, leave, or change tickets.
    pub fn is_joinable(&self) -> bool {
        matches!(self, Self::Waiting)
    }

    /// Returns `true` while draws and claims are accepted.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Started)
    }

    /// Returns `true` once the room can no longer change.
    pub fn is_over(&self) -> bool {
        matches!(self, Self::Ended)
    }

    /// Returns `true` if moving to `target` keeps the lifecycle monotonic.
    pub fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Waiting, Self::Started)
                | (Self::Waiting, Self::Ended)
                | (Self::Started, Self::Ended)
        )
    }
}

impl fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Waiting => write!(f, "waiting"),
            Self::Started => write!(f, "started"),
            Self::Ended => write!(f, "ended"),
        }
    }
}

/// Why a room reached [`RoomStatus::Ended`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EndReason {
    /// The host closed the room.
    Host,
    /// A full-house claim was recorded.
    Housie,
}

// ---------------------------------------------------------------------------
// Claims
// ---------------------------------------------------------------------------

/// The five prize patterns.
///
/// Every type except [`JaldiFive`](Self::JaldiFive) is derived from ticket
/// geometry. Jaldi Five is the odd one out: the claimant picks the five
/// numbers, and only "all drawn" is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ClaimType {
    JaldiFive,
    FirstLine,
    MiddleLine,
    LastLine,
    Housie,
}

impl ClaimType {
    /// All claim types in display order.
    pub const ALL: [ClaimType; 5] = [
        Self::JaldiFive,
        Self::FirstLine,
        Self::MiddleLine,
        Self::LastLine,
        Self::Housie,
    ];

    /// The ticket row a line claim covers.
    pub fn row(self) -> Option<usize> {
        match self {
            Self::FirstLine => Some(0),
            Self::MiddleLine => Some(1),
            Self::LastLine => Some(2),
            Self::JaldiFive | Self::Housie => None,
        }
    }

    /// How many numbers make up the claim's set.
    pub fn expected_len(self) -> usize {
        match self {
            Self::Housie => housie_ticket::NUMBERS_PER_TICKET,
            _ => housie_ticket::NUMBERS_PER_ROW,
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Self::JaldiFive => "Jaldi Five",
            Self::FirstLine => "First Line",
            Self::MiddleLine => "Middle Line",
            Self::LastLine => "Last Line",
            Self::Housie => "Housie",
        }
    }
}

impl fmt::Display for ClaimType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One recorded winner of a claim type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimEntry {
    pub player_id: PlayerId,
    pub player_name: String,
    /// The drawn number that completed the claim.
    pub winning_number: u8,
}

/// Winners per claim type, in the order they were recorded.
///
/// Ties are simply several entries in the same list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimLedger {
    pub jaldi_five_claimed: Vec<ClaimEntry>,
    pub first_line_claimed: Vec<ClaimEntry>,
    pub middle_line_claimed: Vec<ClaimEntry>,
    pub last_line_claimed: Vec<ClaimEntry>,
    pub housie_claimed: Vec<ClaimEntry>,
}

impl ClaimLedger {
    /// Winners recorded for `claim_type`.
    pub fn entries(&self, claim_type: ClaimType) -> &[ClaimEntry] {
        match claim_type {
            ClaimType::JaldiFive => &self.jaldi_five_claimed,
            ClaimType::FirstLine => &self.first_line_claimed,
            ClaimType::MiddleLine => &self.middle_line_claimed,
            ClaimType::LastLine => &self.last_line_claimed,
            ClaimType::Housie => &self.housie_claimed,
        }
    }

    fn entries_mut(&mut self, claim_type: ClaimType) -> &mut Vec<ClaimEntry> {
        match claim_type {
            ClaimType::JaldiFive => &mut self.jaldi_five_claimed,
            ClaimType::FirstLine => &mut self.first_line_claimed,
            ClaimType::MiddleLine => &mut self.middle_line_claimed,
            ClaimType::LastLine => &mut self.last_line_claimed,
            ClaimType::Housie => &mut self.housie_claimed,
        }
    }

    /// Returns `true` if `player` already holds `claim_type`.
    pub fn has_claimed(&self, claim_type: ClaimType, player: &PlayerId) -> bool {
        self.entries(claim_type).iter().any(|e| &e.player_id == player)
    }

    /// Appends a winner.
    pub fn record(&mut self, claim_type: ClaimType, entry: ClaimEntry) {
        self.entries_mut(claim_type).push(entry);
    }

    /// Returns `true` if nobody has claimed anything.
    pub fn is_empty(&self) -> bool {
        ClaimType::ALL.iter().all(|t| self.entries(*t).is_empty())
    }
}

// ---------------------------------------------------------------------------
// Players and snapshots
// ---------------------------------------------------------------------------

/// A participant in a room. The host is always `players[0]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub ticket_count: u8,
    /// Unix epoch milliseconds.
    pub joined_at: u64,
}

/// A self-contained copy of a room's state at one point in its history.
///
/// Every snapshot reflects exactly one completed mutation; `seq` says
/// which one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSnapshot {
    pub code: RoomCode,
    pub ticket_price: u64,
    pub host_id: PlayerId,
    pub players: Vec<Player>,
    pub status: RoomStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_reason: Option<EndReason>,
    /// Unix epoch milliseconds.
    pub created_at: u64,
    /// Publication sequence number; increments once per mutation.
    pub seq: u64,
    pub drawn_numbers: Vec<u8>,
    pub player_tickets: BTreeMap<PlayerId, Vec<Ticket>>,
    #[serde(flatten)]
    pub claims: ClaimLedger,
    pub total_tickets: u64,
    pub total_amount: u64,
    /// Players whose tickets came from the generator's degraded path and
    /// may share numbers across their own batch.
    #[serde(default)]
    pub ticket_fallbacks: Vec<PlayerId>,
}

impl RoomSnapshot {
    /// Looks up a player by id.
    pub fn player(&self, id: &PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| &p.id == id)
    }

    /// Tickets dealt to `id`, empty before the game starts.
    pub fn tickets_of(&self, id: &PlayerId) -> &[Ticket] {
        self.player_tickets.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of draws so far.
    pub fn draw_count(&self) -> usize {
        self.drawn_numbers.len()
    }

    /// The most recent draw.
    pub fn last_drawn(&self) -> Option<u8> {
        self.drawn_numbers.last().copied()
    }
}
