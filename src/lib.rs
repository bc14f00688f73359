pub mod board;
pub mod error;
pub mod game;
pub mod position;
pub mod solver;

pub use board::{Board, CellValue};
pub use error::{GameError, SolverError};
pub use game::{Action, MoveOutcome, Puzzle, Visibility};
pub use position::Position;
pub use solver::{SolveReport, SolveState, SolverChain, SolverConfig};
