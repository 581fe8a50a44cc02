//! Error types for ticket validation.

/// Structural problems found by [`Ticket::validate`](crate::Ticket::validate).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TicketError {
    /// A row does not hold exactly five numbers.
    #[error("row {row} has {found} numbers, expected 5")]
    RowCount { row: usize, found: usize },

    /// A column holds no numbers or more than three.
    #[error("column {column} has {found} numbers, expected 1-3")]
    ColumnCount { column: usize, found: usize },

    /// A value lies outside its column's band.
    #[error("value {value} at row {row}, column {column} is outside the column range")]
    OutOfRange { row: usize, column: usize, value: u8 },

    /// Values in a column are not strictly ascending from top to bottom.
    #[error("column {column} is not in ascending order")]
    ColumnOrder { column: usize },
}
