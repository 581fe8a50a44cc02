//! Claim validation.
//!
//! Works on plain data (draw sequence, one ticket, the ledger) so it can
//! be tested without a room.

use housie_protocol::{ClaimLedger, ClaimType, PlayerId, Ticket};
use housie_ticket::HIGHEST_NUMBER;

use crate::RoomError;

/// A player's request to record one or more claim types on one ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimRequest {
    pub player_id: PlayerId,
    /// Falls back to the registered name when blank.
    pub player_name: String,
    pub ticket_index: usize,
    pub claim_types: Vec<ClaimType>,
    /// The claimant's chosen numbers for Jaldi Five, unchecked.
    pub jaldi_five_numbers: Option<Vec<i64>>,
}

/// What a successful claim recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimOutcome {
    pub recorded: Vec<ClaimType>,
    /// The room is over (a housie was recorded now or earlier).
    pub ended: bool,
}

/// A claim type that passed validation, with the draw that completed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Verified {
    pub claim_type: ClaimType,
    pub winning_number: u8,
}

/// The most recent drawn number that belongs to `set`.
pub fn winning_number(drawn: &[u8], set: &[u8]) -> Option<u8> {
    drawn.iter().rev().copied().find(|n| set.contains(n))
}

/// The numbers a claim type covers on `ticket`.
///
/// Jaldi Five is the exception: its set comes from the claimant and must
/// be five distinct numbers in 1–90. The ticket is not consulted.
fn claim_set(
    claim_type: ClaimType,
    ticket: &Ticket,
    jaldi_five_numbers: Option<&[i64]>,
) -> Result<Vec<u8>, RoomError> {
    let set = match claim_type {
        ClaimType::JaldiFive => {
            let numbers = jaldi_five_numbers.ok_or_else(|| {
                RoomError::InvalidInput("Jaldi Five needs five chosen numbers".into())
            })?;
            let mut chosen: Vec<u8> = numbers
                .iter()
                .filter_map(|&n| u8::try_from(n).ok())
                .filter(|n| (1..=HIGHEST_NUMBER).contains(n))
                .collect();
            let in_range = chosen.len() == numbers.len();
            chosen.sort_unstable();
            chosen.dedup();
            if numbers.len() != claim_type.expected_len()
                || !in_range
                || chosen.len() != numbers.len()
            {
                return Err(RoomError::InvalidInput(
                    "Jaldi Five needs five distinct numbers from 1 to 90".into(),
                ));
            }
            return Ok(chosen);
        }
        ClaimType::Housie => ticket.numbers(),
        line => match line.row() {
            Some(row) => ticket.row_numbers(row),
            None => Vec::new(),
        },
    };

    if set.len() != claim_type.expected_len() {
        return Err(RoomError::InvalidInput(format!(
            "Ticket does not hold a valid {claim_type} set"
        )));
    }
    Ok(set)
}

/// Validates every claim type in `request` that `player` does not already
/// hold.
///
/// Duplicates within the request and types already on the ledger are
/// skipped. Any other failure rejects the whole request. An empty result
/// is left for the caller to reject.
pub(crate) fn verify(
    request: &ClaimRequest,
    ticket: &Ticket,
    drawn: &[u8],
    ledger: &ClaimLedger,
) -> Result<Vec<Verified>, RoomError> {
    let mut verified: Vec<Verified> = Vec::new();

    for &claim_type in &request.claim_types {
        if ledger.has_claimed(claim_type, &request.player_id)
            || verified.iter().any(|v| v.claim_type == claim_type)
        {
            continue;
        }

        let set = claim_set(claim_type, ticket, request.jaldi_five_numbers.as_deref())?;
        if !set.iter().all(|n| drawn.contains(n)) {
            return Err(RoomError::InvalidInput(format!(
                "Not all numbers drawn for {claim_type}"
            )));
        }
        let winning_number = winning_number(drawn, &set).ok_or_else(|| {
            RoomError::InvalidInput(format!("Not all numbers drawn for {claim_type}"))
        })?;

        verified.push(Verified {
            claim_type,
            winning_number,
        });
    }

    Ok(verified)
}

#[cfg(test)]
mod tests {
    use super::*;
    use housie_protocol::ClaimEntry;

    fn ticket() -> Ticket {
        Ticket::from_cells([
            [Some(1), None, Some(20), None, Some(40), None, Some(60), None, Some(80)],
            [None, Some(10), None, Some(30), None, Some(50), None, Some(70), Some(85)],
            [Some(5), None, Some(25), None, Some(45), None, Some(65), None, Some(90)],
        ])
    }

    fn request(types: &[ClaimType]) -> ClaimRequest {
        ClaimRequest {
            player_id: PlayerId::from("p1"),
            player_name: "Asha".into(),
            ticket_index: 0,
            claim_types: types.to_vec(),
            jaldi_five_numbers: None,
        }
    }

    #[test]
    fn test_winning_number_scans_backward() {
        let drawn = [3, 40, 1, 77, 20, 8];
        assert_eq!(winning_number(&drawn, &[1, 20, 40]), Some(20));
        assert_eq!(winning_number(&drawn, &[3]), Some(3));
        assert_eq!(winning_number(&drawn, &[99]), None);
    }

    #[test]
    fn test_first_line_winning_number_is_last_completing_draw() {
        let drawn = [60, 2, 1, 80, 40, 33, 20];
        let verified = verify(&request(&[ClaimType::FirstLine]), &ticket(), &drawn, &ClaimLedger::default())
            .unwrap();
        assert_eq!(
            verified,
            vec![Verified {
                claim_type: ClaimType::FirstLine,
                winning_number: 20
            }]
        );
    }

    #[test]
    fn test_undrawn_numbers_reject_claim() {
        let drawn = [1, 20, 40, 60];
        let err = verify(&request(&[ClaimType::FirstLine]), &ticket(), &drawn, &ClaimLedger::default())
            .unwrap_err();
        assert!(matches!(err, RoomError::InvalidInput(_)));
    }

    #[test]
    fn test_bundle_rejected_whole_when_one_type_fails() {
        let drawn = [1, 20, 40, 60, 80];
        let err = verify(
            &request(&[ClaimType::FirstLine, ClaimType::MiddleLine]),
            &ticket(),
            &drawn,
            &ClaimLedger::default(),
        )
        .unwrap_err();
        assert!(matches!(err, RoomError::InvalidInput(_)));
    }

    #[test]
    fn test_already_claimed_types_are_skipped() {
        let drawn = [1, 20, 40, 60, 80, 10, 30, 50, 70, 85];
        let mut ledger = ClaimLedger::default();
        ledger.record(
            ClaimType::FirstLine,
            ClaimEntry {
                player_id: PlayerId::from("p1"),
                player_name: "Asha".into(),
                winning_number: 80,
            },
        );
        let verified = verify(
            &request(&[ClaimType::FirstLine, ClaimType::MiddleLine, ClaimType::MiddleLine]),
            &ticket(),
            &drawn,
            &ledger,
        )
        .unwrap();
        assert_eq!(verified.len(), 1);
        assert_eq!(verified[0].claim_type, ClaimType::MiddleLine);
        assert_eq!(verified[0].winning_number, 85);
    }

    #[test]
    fn test_jaldi_five_uses_chosen_numbers() {
        let drawn = [7, 13, 22, 56, 89];
        let mut req = request(&[ClaimType::JaldiFive]);
        req.jaldi_five_numbers = Some(vec![89, 7, 13, 22, 56]);
        let verified = verify(&req, &ticket(), &drawn, &ClaimLedger::default()).unwrap();
        assert_eq!(verified[0].winning_number, 89);
    }

    #[test]
    fn test_jaldi_five_rejects_bad_selections() {
        let drawn: Vec<u8> = (1..=90).collect();
        for numbers in [
            None,
            Some(vec![1, 2, 3, 4]),
            Some(vec![1, 2, 3, 4, 4]),
            Some(vec![0, 2, 3, 4, 5]),
            Some(vec![1, 2, 3, 4, 91]),
            Some(vec![1, 2, 3, 4, 300]),
            Some(vec![-1, 2, 3, 4, 5]),
            Some(vec![1, 2, 3, 4, 5, 6]),
        ] {
            let mut req = request(&[ClaimType::JaldiFive]);
            req.jaldi_five_numbers = numbers;
            let err = verify(&req, &ticket(), &drawn, &ClaimLedger::default()).unwrap_err();
            assert!(matches!(err, RoomError::InvalidInput(_)));
        }
    }
}
