//! The ticket grid and its geometry constants.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::TicketError;

/// Rows on a ticket.
pub const ROWS: usize = 3;

/// Columns on a ticket.
pub const COLUMNS: usize = 9;

/// Filled cells in every row.
pub const NUMBERS_PER_ROW: usize = 5;

/// Filled cells on a whole ticket.
pub const NUMBERS_PER_TICKET: usize = ROWS * NUMBERS_PER_ROW;

/// Most filled cells a single column may hold.
pub const MAX_PER_COLUMN: usize = 3;

/// Largest batch the generator produces for one player.
pub const MAX_TICKETS: usize = 6;

/// Highest number that can be drawn or printed on a ticket.
pub const HIGHEST_NUMBER: u8 = 90;

/// The band of values column `column` may hold.
///
/// Column 0 is `1..=9`, columns 1–7 are ten-wide (`10..=19` … `70..=79`),
/// and the last column absorbs 90 (`80..=90`).
///
/// # Panics
/// Panics if `column >= COLUMNS`.
pub fn column_range(column: usize) -> RangeInclusive<u8> {
    assert!(column < COLUMNS, "column {column} out of bounds");
    match column {
        0 => 1..=9,
        c if c == COLUMNS - 1 => 80..=HIGHEST_NUMBER,
        c => {
            let start = (c * 10) as u8;
            start..=start + 9
        }
    }
}

/// One 3×9 ticket. `None` marks a blank cell.
///
/// Serialized transparently as the grid itself, e.g.
/// `[[3,null,21,...],[...],[...]]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ticket {
    cells: [[Option<u8>; COLUMNS]; ROWS],
}

impl Ticket {
    /// Wraps a raw grid. No validation is performed; call
    /// [`validate`](Self::validate) when the grid comes from outside.
    pub fn from_cells(cells: [[Option<u8>; COLUMNS]; ROWS]) -> Self {
        Self { cells }
    }

    /// The raw grid.
    pub fn cells(&self) -> &[[Option<u8>; COLUMNS]; ROWS] {
        &self.cells
    }

    /// The value at `(row, column)`, if the cell is filled.
    pub fn cell(&self, row: usize, column: usize) -> Option<u8> {
        self.cells.get(row)?.get(column).copied().flatten()
    }

    /// Numbers in `row`, left to right. Empty for an out-of-range row.
    pub fn row_numbers(&self, row: usize) -> Vec<u8> {
        self.cells
            .get(row)
            .map(|r| r.iter().flatten().copied().collect())
            .unwrap_or_default()
    }

    /// Every number on the ticket in row-major order.
    pub fn numbers(&self) -> Vec<u8> {
        self.cells.iter().flatten().flatten().copied().collect()
    }

    /// Returns `true` if `number` is printed anywhere on the ticket.
    pub fn contains(&self, number: u8) -> bool {
        self.cells.iter().flatten().any(|c| *c == Some(number))
    }

    /// Checks every structural rule a generated ticket must satisfy.
    pub fn validate(&self) -> Result<(), TicketError> {
        for (row, cells) in self.cells.iter().enumerate() {
            let found = cells.iter().flatten().count();
            if found != NUMBERS_PER_ROW {
                return Err(TicketError::RowCount { row, found });
            }
        }

        for column in 0..COLUMNS {
            let range = column_range(column);
            let mut found = 0;
            let mut previous: Option<u8> = None;
            for row in 0..ROWS {
                let Some(value) = self.cells[row][column] else {
                    continue;
                };
                if !range.contains(&value) {
                    return Err(TicketError::OutOfRange { row, column, value });
                }
                if previous.is_some_and(|p| p >= value) {
                    return Err(TicketError::ColumnOrder { column });
                }
                previous = Some(value);
                found += 1;
            }
            if found == 0 || found > MAX_PER_COLUMN {
                return Err(TicketError::ColumnCount { column, found });
            }
        }

        Ok(())
    }
}
