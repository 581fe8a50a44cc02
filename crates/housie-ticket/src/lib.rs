//! Ticket grids and the batch ticket generator for Housie.
//!
//! A ticket is a 3×9 grid holding 15 numbers from 1–90: five per row,
//! one to three per column, each column drawn from its own band
//! (`1–9`, `10–19`, …, `70–79`, `80–90`).
//!
//! # Key types
//!
//! - [`Ticket`]: one validated grid, serialized as nested arrays with
//!   `null` for blank cells
//! - [`generate_tickets`]: a batch of 1–6 tickets with no number repeated
//!   across the batch
//! - [`TicketBatch`] / [`Uniqueness`]: the batch plus whether the
//!   cross-ticket uniqueness guarantee held
//!
//! The generator never fails. When the greedy demand allocation cannot
//! satisfy the batch constraints it falls back to independent tickets and
//! reports [`Uniqueness::Degraded`] instead of hiding it.

mod error;
mod generator;
mod ticket;

pub use error::TicketError;
pub use generator::{
    TicketBatch, Uniqueness, generate_ticket, generate_ticket_with,
    generate_tickets, generate_tickets_with,
};
pub use ticket::{
    COLUMNS, HIGHEST_NUMBER, MAX_PER_COLUMN, MAX_TICKETS, NUMBERS_PER_ROW,
    NUMBERS_PER_TICKET, ROWS, Ticket, column_range,
};
