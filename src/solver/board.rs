use crate::{CellValue, Position, Puzzle, Visibility};

/// A view of the game that hides information the solver shouldn't have access to
#[derive(Debug, Clone, Copy)]
pub struct SolverBoard<'a> {
    puzzle: &'a Puzzle,
}

impl<'a> SolverBoard<'a> {
    pub fn new(puzzle: &'a Puzzle) -> Self {
        Self { puzzle }
    }

    /// Gets cell state without revealing mine information
    pub fn get(&self, pos: Position) -> Option<SolverCell> {
        let cell = match self.puzzle.visibility(pos)? {
            Visibility::Covered => SolverCell::Covered,
            Visibility::Flagged => SolverCell::Flagged,
            Visibility::Revealed => match self.puzzle.revealed_value(pos)? {
                CellValue::Clue(n) => SolverCell::Revealed(n),
                CellValue::Mine => SolverCell::Detonated,
            },
        };
        Some(cell)
    }

    /// `(rows, cols)`
    pub fn dimensions(&self) -> (usize, usize) {
        self.puzzle.dimensions()
    }

    pub fn total_cells(&self) -> usize {
        let (rows, cols) = self.dimensions();
        rows * cols
    }

    pub fn total_mines(&self) -> usize {
        self.puzzle.mines_count()
    }

    pub fn mines_marked(&self) -> usize {
        self.puzzle.flagged_count()
    }

    /// True before the first reveal.
    pub fn is_start(&self) -> bool {
        self.puzzle.revealed_count() == 0
    }

    pub fn neighbors(&self, pos: Position) -> Vec<Position> {
        pos.neighbors()
            .filter(|p| self.puzzle.visibility(*p).is_some())
            .collect()
    }

    /// Row-major iteration over every coordinate.
    pub fn iter_positions(&self) -> impl Iterator<Item = Position> {
        let (rows, cols) = self.dimensions();
        (0..rows).flat_map(move |r| (0..cols).map(move |c| Position::new(r as i32, c as i32)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverCell {
    Covered,      // Unknown and unflagged cell
    Revealed(u8), // Number of neighboring mines
    Flagged,      // Marked as a mine
    Detonated,    // A revealed mine, the game is lost
}
