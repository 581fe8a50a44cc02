//! Prize pool allocation.
//!
//! The pool is split 20/15/15/15/35 across the five claim types. Each share
//! is rounded to a multiple of 5 (minimum 5). On small pools that rounding
//! can overshoot the total, in which case every share is recomputed as a
//! multiple of 2 (minimum 2) instead. All arithmetic is integer and rounds
//! half up.

use housie_protocol::{ClaimType, PlayerId, RoomSnapshot};
use serde::{Deserialize, Serialize};

/// Percentage of the total pool per claim type.
const SPLIT: [(ClaimType, u64); 5] = [
    (ClaimType::JaldiFive, 20),
    (ClaimType::FirstLine, 15),
    (ClaimType::MiddleLine, 15),
    (ClaimType::LastLine, 15),
    (ClaimType::Housie, 35),
];

/// The prize pool of each claim type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrizePools {
    pub jaldi_five: u64,
    pub first_line: u64,
    pub middle_line: u64,
    pub last_line: u64,
    pub housie: u64,
}

impl PrizePools {
    pub fn for_claim(&self, claim_type: ClaimType) -> u64 {
        match claim_type {
            ClaimType::JaldiFive => self.jaldi_five,
            ClaimType::FirstLine => self.first_line,
            ClaimType::MiddleLine => self.middle_line,
            ClaimType::LastLine => self.last_line,
            ClaimType::Housie => self.housie,
        }
    }

    pub fn total(&self) -> u64 {
        ClaimType::ALL.iter().map(|t| self.for_claim(*t)).sum()
    }

    fn from_shares(shares: [u64; 5]) -> Self {
        let [jaldi_five, first_line, middle_line, last_line, housie] = shares;
        Self {
            jaldi_five,
            first_line,
            middle_line,
            last_line,
            housie,
        }
    }
}

/// `total * percent / 100`, rounded half-up to a multiple of `step`, at
/// least `step`.
fn rounded_share(total: u64, percent: u64, step: u64) -> u64 {
    let denominator = u128::from(100 * step);
    let steps = (u128::from(total) * u128::from(percent) + denominator / 2) / denominator;
    let share = (steps * u128::from(step)).max(u128::from(step));
    // Never more than a step above `total * percent / 100`.
    u64::try_from(share).unwrap_or(u64::MAX)
}

/// Splits `total` into the five claim pools.
pub fn prize_pools(total: u64) -> PrizePools {
    let by_five = SPLIT.map(|(_, percent)| rounded_share(total, percent, 5));
    let sum: u128 = by_five.iter().map(|&share| u128::from(share)).sum();

    if sum > u128::from(total) {
        return PrizePools::from_shares(SPLIT.map(|(_, percent)| rounded_share(total, percent, 2)));
    }

    let mut pools = PrizePools::from_shares(by_five);
    pools.housie += total - sum as u64;
    pools
}

/// One winner's share of `pool`, rounded half-up. Zero when nobody won.
pub fn prize_per_winner(pool: u64, winners: usize) -> u64 {
    if winners == 0 {
        return 0;
    }
    let winners = winners as u128;
    let share = (2 * u128::from(pool) + winners) / (2 * winners);
    u64::try_from(share).unwrap_or(u64::MAX)
}

/// One row of a room's prize table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payout {
    pub claim_type: ClaimType,
    pub player_id: PlayerId,
    pub player_name: String,
    pub winning_number: u8,
    pub amount: u64,
}

/// Prize pools for a room's current ticket total.
pub fn room_prize_pools(room: &RoomSnapshot) -> PrizePools {
    prize_pools(room.total_amount)
}

/// Every recorded winner with their share, in claim-type order.
pub fn payouts(room: &RoomSnapshot) -> Vec<Payout> {
    let pools = room_prize_pools(room);
    ClaimType::ALL
        .iter()
        .flat_map(|&claim_type| {
            let entries = room.claims.entries(claim_type);
            let amount = prize_per_winner(pools.for_claim(claim_type), entries.len());
            entries.iter().map(move |entry| Payout {
                claim_type,
                player_id: entry.player_id.clone(),
                player_name: entry.player_name.clone(),
                winning_number: entry.winning_number,
                amount,
            })
        })
        .collect()
}
