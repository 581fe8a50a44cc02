//! Ordered room publications and the consumer-side staleness rule.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::{RoomCode, RoomSnapshot, RoomStatus};

/// A room snapshot pushed to subscribers after one completed mutation.
///
/// `seq` is copied from the snapshot and strictly increases per room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Publication {
    pub code: RoomCode,
    pub seq: u64,
    pub room: RoomSnapshot,
}

impl Publication {
    pub fn new(room: RoomSnapshot) -> Self {
        Self {
            code: room.code.clone(),
            seq: room.seq,
            room,
        }
    }
}

/// Drops publications that would move a consumer's view backwards.
///
/// Per room it remembers the highest accepted `seq` and draw count. A
/// publication is accepted when:
///
/// - its room status is `ended` (always wins, whatever its position), or
/// - its `seq` is greater than the last accepted one **and** its draw
///   count is not lower.
#[derive(Debug, Default)]
pub struct StaleFilter {
    seen: HashMap<RoomCode, (u64, usize)>,
}

impl StaleFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if `publication` should be delivered, and records it.
    pub fn accept(&mut self, publication: &Publication) -> bool {
        let draws = publication.room.draw_count();
        let ended = publication.room.status == RoomStatus::Ended;

        let fresh = match self.seen.get(&publication.code) {
            None => true,
            Some(&(seq, seen_draws)) => {
                ended || (publication.seq > seq && draws >= seen_draws)
            }
        };

        if fresh {
            let entry = self.seen.entry(publication.code.clone()).or_insert((0, 0));
            entry.0 = entry.0.max(publication.seq);
            entry.1 = entry.1.max(draws);
        }
        fresh
    }

    /// Forgets a room, e.g. after unsubscribing.
    pub fn forget(&mut self, code: &RoomCode) {
        self.seen.remove(code);
    }
}
