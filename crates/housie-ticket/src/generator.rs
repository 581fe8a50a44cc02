//! Batch ticket generation.
//!
//! A batch of `n` tickets uses `15 * n` distinct numbers, so no number
//! appears on two tickets of the same batch. Generation runs in four
//! steps:
//!
//! 1. **Column budget**: how many numbers each column contributes to
//!    the whole batch (at least `n`, at most the column's band size).
//! 2. **Demand matrix**: how many of those each ticket takes per
//!    column (1–3 per cell, 15 per ticket), allocated greedily to the
//!    ticket with the fewest cells so far.
//! 3. **Values**: each column's budget is sampled without replacement
//!    from its band and split across tickets per the demand matrix.
//! 4. **Layout**: per ticket, columns with the highest demand are placed
//!    first into the rows with the most room left, until every row holds
//!    five numbers.
//!
//! If step 2 cannot satisfy the constraints the batch is rebuilt from
//! independent tickets and marked [`Uniqueness::Degraded`]. A single
//! ticket rebuilt this way is still [`Uniqueness::Unique`].

use rand::Rng;
use rand::seq::SliceRandom;
use rand::seq::index;

use crate::ticket::{
    COLUMNS, MAX_PER_COLUMN, MAX_TICKETS, NUMBERS_PER_ROW,
    NUMBERS_PER_TICKET, ROWS, Ticket, column_range,
};

/// How many values exist in each column's band.
const COLUMN_CAPACITY: [usize; COLUMNS] = [9, 10, 10, 10, 10, 10, 10, 10, 11];

/// Column layout of a standalone ticket before shuffling.
const STANDALONE_LAYOUT: [usize; COLUMNS] = [2, 2, 2, 2, 2, 2, 1, 1, 1];

/// Per-ticket, per-column cell counts.
type Demand = [usize; COLUMNS];

/// Which cells of a ticket hold a number.
type Layout = [[bool; COLUMNS]; ROWS];

/// Whether a batch kept the no-repeats guarantee.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Uniqueness {
    /// No number appears on more than one ticket of the batch.
    Unique,
    /// The demand allocation was infeasible; tickets were generated
    /// independently and numbers may repeat across them.
    Degraded,
}

/// The output of [`generate_tickets`].
#[derive(Debug, Clone)]
pub struct TicketBatch {
    pub tickets: Vec<Ticket>,
    pub uniqueness: Uniqueness,
}

impl TicketBatch {
    /// Returns `true` if the batch came from the fallback path.
    pub fn is_degraded(&self) -> bool {
        self.uniqueness == Uniqueness::Degraded
    }
}

/// Generates `count` tickets (clamped to 1–6) with the thread-local RNG.
pub fn generate_tickets(count: usize) -> TicketBatch {
    generate_tickets_with(&mut rand::rng(), count)
}

/// Generates `count` tickets (clamped to 1–6) from the given RNG.
pub fn generate_tickets_with<R: Rng + ?Sized>(
    rng: &mut R,
    count: usize,
) -> TicketBatch {
    let count = count.clamp(1, MAX_TICKETS);
    let budget = column_budget(rng, count);

    let unique = demand_matrix(count, &budget)
        .and_then(|demand| fill_batch(rng, &budget, &demand));

    match unique {
        Some(tickets) => TicketBatch {
            tickets,
            uniqueness: Uniqueness::Unique,
        },
        // A lone ticket has no other ticket to repeat numbers with.
        None if count == 1 => TicketBatch {
            tickets: vec![generate_ticket_with(rng)],
            uniqueness: Uniqueness::Unique,
        },
        None => {
            tracing::warn!(
                count,
                ?budget,
                "ticket demand allocation infeasible, generating tickets independently"
            );
            TicketBatch {
                tickets: (0..count).map(|_| generate_ticket_with(rng)).collect(),
                uniqueness: Uniqueness::Degraded,
            }
        }
    }
}

/// Generates one standalone ticket with the thread-local RNG.
pub fn generate_ticket() -> Ticket {
    generate_ticket_with(&mut rand::rng())
}

/// Generates one standalone ticket from the given RNG.
///
/// Six columns get two numbers and three get one, in random positions.
pub fn generate_ticket_with<R: Rng + ?Sized>(rng: &mut R) -> Ticket {
    loop {
        let mut demand = STANDALONE_LAYOUT;
        demand.shuffle(rng);
        // With every column at most 2 the greedy layout keeps row room
        // within one of each other, so this succeeds on the first pass.
        let Some(layout) = layout(rng, &demand) else {
            continue;
        };
        let values: Vec<Vec<u8>> = (0..COLUMNS)
            .map(|column| sample_sorted(rng, column, demand[column]))
            .collect();
        return place(&layout, &values);
    }
}

/// Step 1: the number of values each column contributes to the batch.
fn column_budget<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Demand {
    let mut budget = [count; COLUMNS];
    let mut extra = count * NUMBERS_PER_TICKET - COLUMNS * count;

    while extra > 0 {
        let column = rng.random_range(0..COLUMNS);
        if budget[column] < COLUMN_CAPACITY[column] {
            budget[column] += 1;
            extra -= 1;
        }
    }

    budget
}

/// Step 2: split each column's budget across tickets.
///
/// Every cell starts at 1. Extras go to the eligible ticket with the
/// fewest cells so far (lowest index on ties). Returns `None` when an
/// extra has nowhere to go.
fn demand_matrix(count: usize, budget: &Demand) -> Option<Vec<Demand>> {
    let mut demand = vec![[1; COLUMNS]; count];
    let mut used = vec![COLUMNS; count];

    for column in 0..COLUMNS {
        for _ in count..budget[column] {
            let ticket = (0..count)
                .filter(|&t| {
                    used[t] < NUMBERS_PER_TICKET
                        && demand[t][column] < MAX_PER_COLUMN
                })
                .min_by_key(|&t| used[t])?;
            demand[ticket][column] += 1;
            used[ticket] += 1;
        }
    }

    Some(demand)
}

/// Steps 3 and 4: sample values per column, then lay out each ticket.
fn fill_batch<R: Rng + ?Sized>(
    rng: &mut R,
    budget: &Demand,
    demand: &[Demand],
) -> Option<Vec<Ticket>> {
    let mut shares: Vec<Vec<Vec<u8>>> = vec![vec![Vec::new(); COLUMNS]; demand.len()];

    for column in 0..COLUMNS {
        let range = column_range(column);
        let start = *range.start();
        let picked = index::sample(rng, range.len(), budget[column]);
        let mut values = picked.iter().map(|i| start + i as u8);

        for (ticket, row) in demand.iter().enumerate() {
            let mut share: Vec<u8> = values.by_ref().take(row[column]).collect();
            share.sort_unstable();
            shares[ticket][column] = share;
        }
    }

    demand
        .iter()
        .zip(&shares)
        .map(|(row, values)| layout(rng, row).map(|l| place(&l, values)))
        .collect()
}

/// Step 4: choose which cells are filled.
///
/// Columns go in descending demand order; each takes the rows with the
/// most room left, ties broken randomly.
fn layout<R: Rng + ?Sized>(rng: &mut R, demand: &Demand) -> Option<Layout> {
    let mut filled = [[false; COLUMNS]; ROWS];
    let mut room = [NUMBERS_PER_ROW; ROWS];

    let mut columns: Vec<usize> = (0..COLUMNS).collect();
    columns.sort_by(|a, b| demand[*b].cmp(&demand[*a]));

    for column in columns {
        let need = demand[column];
        if need == 0 || need > ROWS {
            return None;
        }

        let mut rows: [usize; ROWS] = [0, 1, 2];
        rows.shuffle(rng);
        rows.sort_by(|a, b| room[*b].cmp(&room[*a]));

        let chosen = &rows[..need];
        if chosen.iter().any(|&r| room[r] == 0) {
            return None;
        }
        for &r in chosen {
            filled[r][column] = true;
            room[r] -= 1;
        }
    }

    room.iter().all(|&r| r == 0).then_some(filled)
}

/// Step 5: write each column's sorted values into its filled rows, top
/// to bottom.
fn place(layout: &Layout, values: &[Vec<u8>]) -> Ticket {
    let mut cells = [[None; COLUMNS]; ROWS];
    for column in 0..COLUMNS {
        let rows = (0..ROWS).filter(|&r| layout[r][column]);
        for (row, &value) in rows.zip(&values[column]) {
            cells[row][column] = Some(value);
        }
    }
    Ticket::from_cells(cells)
}

/// `n` distinct values from `column`'s band, ascending.
fn sample_sorted<R: Rng + ?Sized>(rng: &mut R, column: usize, n: usize) -> Vec<u8> {
    let range = column_range(column);
    let start = *range.start();
    let mut values: Vec<u8> = index::sample(rng, range.len(), n)
        .iter()
        .map(|i| start + i as u8)
        .collect();
    values.sort_unstable();
    values
}
