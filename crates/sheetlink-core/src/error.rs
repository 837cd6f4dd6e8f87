use thiserror::Error;

/// Errors produced while resolving A1 range notation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    /// Nothing to parse
    #[error("A1 notation is required")]
    Empty,
    /// The notation does not follow `COL[ROW][:COL[ROW]]`, e.g. a bare row
    #[error("A1 notation [{0}] is invalid")]
    Malformed(String),
    /// Row `0` or a row/column index that does not fit the grid
    #[error("A1 notation [{0}] is out of range")]
    OutOfRange(String),
}
