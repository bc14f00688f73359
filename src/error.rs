use crate::Position;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GameError {
    #[error("Position {0:?} is out of bounds")]
    OutOfBounds(Position),
    #[error("Malformed header {0:?}, expected `rows cols mines`")]
    MalformedHeader(String),
    #[error("Invalid token {token:?} on row {row}")]
    InvalidToken { row: usize, token: String },
    #[error("Row {row} has {found} tokens, expected {expected}")]
    WrongTokenCount {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("Board has {found} rows, expected {expected}")]
    WrongRowCount { expected: usize, found: usize },
    #[error("Too many mines ({mines}) for board size {rows}x{cols}")]
    TooManyMines { rows: usize, cols: usize, mines: usize },
    #[error("Header declares {declared} mines but the grid holds {found}")]
    MineCountMismatch { declared: usize, found: usize },
    #[error("Failed to read board: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SolverError {
    #[error("Frontier of {size} cells exceeds the enumeration limit of {limit}")]
    FrontierTooLarge { size: usize, limit: usize },
    #[error("Invalid solver configuration: {0}")]
    InvalidConfig(String),
}
