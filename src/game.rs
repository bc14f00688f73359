use crate::{Board, CellValue, GameError, Position};
use ndarray::Array2;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// What the player can see of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Covered,
    Flagged,
    Revealed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Reveal,
    Flag,
    Unflag,
}

impl FromStr for Action {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reveal" | "r" => Ok(Action::Reveal),
            "flag" | "f" => Ok(Action::Flag),
            "unflag" | "u" => Ok(Action::Unflag),
            _ => Err(()),
        }
    }
}

/// Result of [`Puzzle::apply_move`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Flagged,
    Unflagged,
    AlreadyRevealed,
    FlaggedCell,
    HitMine,
    Clue(u8),
    InvalidAction,
}

impl fmt::Display for MoveOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveOutcome::Flagged => write!(f, "flagged"),
            MoveOutcome::Unflagged => write!(f, "unflagged"),
            MoveOutcome::AlreadyRevealed => write!(f, "already_revealed"),
            MoveOutcome::FlaggedCell => write!(f, "flagged_cell"),
            MoveOutcome::HitMine => write!(f, "hit_mine"),
            MoveOutcome::Clue(n) => write!(f, "{n}"),
            MoveOutcome::InvalidAction => write!(f, "invalid_action"),
        }
    }
}

/// One game in progress: the ground-truth board plus the player's revealed
/// and flagged cells. Cloning is cheap, the board itself is shared.
#[derive(Debug, Clone)]
pub struct Puzzle {
    board: Arc<Board>,
    visibility: Array2<Visibility>,
    revealed_count: usize,
    detonated: Option<Position>,
}

impl Puzzle {
    pub fn new(board: Board) -> Self {
        let visibility = Array2::from_elem(board.dimensions(), Visibility::Covered);
        Self {
            board: Arc::new(board),
            visibility,
            revealed_count: 0,
            detonated: None,
        }
    }

    /// Ground truth. Solvers must go through [`crate::solver::SolverBoard`].
    pub fn board(&self) -> &Board {
        &self.board
    }

    fn check_bounds(&self, pos: Position) -> Result<(), GameError> {
        if self.board.is_within_bounds(pos) {
            Ok(())
        } else {
            Err(GameError::OutOfBounds(pos))
        }
    }

    /// Reveals a single cell. Returns `None` when the cell is already
    /// revealed or flagged.
    pub fn reveal(&mut self, pos: Position) -> Result<Option<CellValue>, GameError> {
        self.check_bounds(pos)?;
        if self.visibility[pos.to_index()] != Visibility::Covered {
            return Ok(None);
        }

        self.visibility[pos.to_index()] = Visibility::Revealed;
        self.revealed_count += 1;
        let value = self.board.get_cell(pos)?;
        if value.is_mine() && self.detonated.is_none() {
            self.detonated = Some(pos);
        }
        Ok(Some(value))
    }

    /// Flags a covered cell. Revealed cells are left alone.
    pub fn flag(&mut self, pos: Position) -> Result<(), GameError> {
        self.check_bounds(pos)?;
        if self.visibility[pos.to_index()] == Visibility::Covered {
            self.visibility[pos.to_index()] = Visibility::Flagged;
        }
        Ok(())
    }

    pub fn unflag(&mut self, pos: Position) -> Result<(), GameError> {
        self.check_bounds(pos)?;
        if self.visibility[pos.to_index()] == Visibility::Flagged {
            self.visibility[pos.to_index()] = Visibility::Covered;
        }
        Ok(())
    }

    pub fn apply_move(&mut self, action: Action, pos: Position) -> Result<MoveOutcome, GameError> {
        self.check_bounds(pos)?;

        let outcome = match action {
            Action::Reveal => {
                if self.visibility[pos.to_index()] == Visibility::Flagged {
                    return Ok(MoveOutcome::FlaggedCell);
                }
                match self.reveal(pos)? {
                    None => MoveOutcome::AlreadyRevealed,
                    Some(CellValue::Mine) => MoveOutcome::HitMine,
                    Some(CellValue::Clue(n)) => MoveOutcome::Clue(n),
                }
            }
            Action::Flag => {
                if self.visibility[pos.to_index()] == Visibility::Revealed {
                    MoveOutcome::AlreadyRevealed
                } else {
                    self.flag(pos)?;
                    MoveOutcome::Flagged
                }
            }
            Action::Unflag => {
                self.unflag(pos)?;
                MoveOutcome::Unflagged
            }
        };

        Ok(outcome)
    }

    /// Like [`Puzzle::apply_move`], with the action given as text.
    pub fn apply_command(&mut self, action: &str, pos: Position) -> Result<MoveOutcome, GameError> {
        match action.parse::<Action>() {
            Ok(action) => self.apply_move(action, pos),
            Err(()) => Ok(MoveOutcome::InvalidAction),
        }
    }

    pub fn visibility(&self, pos: Position) -> Option<Visibility> {
        self.board
            .is_within_bounds(pos)
            .then(|| self.visibility[pos.to_index()])
    }

    /// The ground-truth value of a cell, but only once it has been revealed.
    pub fn revealed_value(&self, pos: Position) -> Option<CellValue> {
        match self.visibility(pos)? {
            Visibility::Revealed => self.board.get_cell(pos).ok(),
            _ => None,
        }
    }

    pub fn is_solved(&self) -> bool {
        self.detonated.is_none()
            && self.revealed_count == self.board.total_cells() - self.board.mines_count()
    }

    pub fn is_lost(&self) -> bool {
        self.detonated.is_some()
    }

    pub fn detonated(&self) -> Option<Position> {
        self.detonated
    }

    /// Declared mine count, public knowledge from the board header.
    pub fn mines_count(&self) -> usize {
        self.board.mines_count()
    }

    pub fn revealed_count(&self) -> usize {
        self.revealed_count
    }

    pub fn flagged_count(&self) -> usize {
        self.visibility
            .iter()
            .filter(|v| **v == Visibility::Flagged)
            .count()
    }

    /// Covered, unflagged cells in row-major order.
    pub fn covered_positions(&self) -> Vec<Position> {
        self.board
            .iter_positions()
            .filter(|&pos| self.visibility[pos.to_index()] == Visibility::Covered)
            .collect()
    }

    pub fn dimensions(&self) -> (usize, usize) {
        self.board.dimensions()
    }
}

impl fmt::Display for Puzzle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (rows, cols) = self.dimensions();
        for r in 0..rows {
            let row: Vec<String> = (0..cols)
                .map(|c| {
                    let pos = Position::new(r as i32, c as i32);
                    match self.visibility[pos.to_index()] {
                        Visibility::Covered => "?".to_string(),
                        Visibility::Flagged => "F".to_string(),
                        Visibility::Revealed => match self.board.get_cell(pos) {
                            Ok(CellValue::Clue(n)) => n.to_string(),
                            _ => "*".to_string(),
                        },
                    }
                })
                .collect();
            writeln!(f, "{}", row.join(" "))?;
        }
        Ok(())
    }
}
