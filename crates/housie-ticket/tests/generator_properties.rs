//! Property sweeps over the batch generator using seeded RNGs.

use std::collections::HashSet;

use housie_ticket::{
    COLUMNS, MAX_TICKETS, NUMBERS_PER_TICKET, ROWS, Ticket, Uniqueness,
    column_range, generate_tickets, generate_tickets_with,
};
use rand::SeedableRng;
use rand::rngs::StdRng;

// =========================================================================
// Helpers
// =========================================================================

const SEEDS: u64 = 200;

fn assert_ticket_shape(ticket: &Ticket) {
    ticket.validate().expect("ticket should be structurally valid");
    assert_eq!(ticket.numbers().len(), NUMBERS_PER_TICKET);
    for column in 0..COLUMNS {
        let range = column_range(column);
        let filled = (0..ROWS).filter_map(|r| ticket.cell(r, column)).count();
        assert!((1..=3).contains(&filled), "column {column} has {filled}");
        for row in 0..ROWS {
            if let Some(v) = ticket.cell(row, column) {
                assert!(range.contains(&v));
            }
        }
    }
}

// =========================================================================
// Batch properties
// =========================================================================

#[test]
fn test_every_batch_size_produces_valid_tickets() {
    for count in 1..=MAX_TICKETS {
        for seed in 0..SEEDS {
            let mut rng = StdRng::seed_from_u64(seed * 31 + count as u64);
            let batch = generate_tickets_with(&mut rng, count);
            assert_eq!(batch.tickets.len(), count);
            for ticket in &batch.tickets {
                assert_ticket_shape(ticket);
            }
        }
    }
}

#[test]
fn test_unique_batches_never_repeat_a_number() {
    for count in 1..=MAX_TICKETS {
        for seed in 0..SEEDS {
            let mut rng = StdRng::seed_from_u64(seed * 17 + count as u64);
            let batch = generate_tickets_with(&mut rng, count);
            if batch.uniqueness == Uniqueness::Degraded {
                continue;
            }
            let mut seen = HashSet::new();
            for n in batch.tickets.iter().flat_map(Ticket::numbers) {
                assert!(seen.insert(n), "{n} repeated (count {count}, seed {seed})");
            }
            assert_eq!(seen.len(), count * NUMBERS_PER_TICKET);
        }
    }
}

#[test]
fn test_full_batch_covers_one_to_ninety() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut unique_seen = false;
    for _ in 0..50 {
        let batch = generate_tickets_with(&mut rng, MAX_TICKETS);
        if batch.is_degraded() {
            continue;
        }
        unique_seen = true;
        let mut all: Vec<u8> = batch.tickets.iter().flat_map(Ticket::numbers).collect();
        all.sort_unstable();
        assert_eq!(all, (1..=90).collect::<Vec<u8>>());
    }
    assert!(unique_seen, "expected at least one unique full batch");
}

#[test]
fn test_degraded_batches_are_reported_and_still_valid() {
    // A batch falls back whenever one column's budget exceeds three per
    // ticket; over many seeds both paths occur.
    let mut degraded = 0;
    for count in 2..=MAX_TICKETS {
        for seed in 0..SEEDS {
            let mut rng = StdRng::seed_from_u64(seed);
            let batch = generate_tickets_with(&mut rng, count);
            if batch.is_degraded() {
                degraded += 1;
            }
            assert_eq!(batch.tickets.len(), count);
            batch.tickets.iter().for_each(assert_ticket_shape);
        }
    }
    assert!(degraded > 0, "fallback path never exercised");
}

#[test]
fn test_single_ticket_batch_is_never_degraded() {
    for seed in 0..SEEDS {
        let mut rng = StdRng::seed_from_u64(seed);
        let batch = generate_tickets_with(&mut rng, 1);
        assert_eq!(batch.uniqueness, Uniqueness::Unique);
        assert_eq!(batch.tickets.len(), 1);
        assert_ticket_shape(&batch.tickets[0]);
    }
}

#[test]
fn test_thread_rng_entry_point() {
    let batch = generate_tickets(3);
    assert_eq!(batch.tickets.len(), 3);
    batch.tickets.iter().for_each(assert_ticket_shape);
}
