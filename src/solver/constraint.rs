use super::board::{SolverBoard, SolverCell};
use crate::Position;
use std::collections::BTreeSet;

/// The mines still owed by one revealed clue, spread over its covered
/// neighbors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    /// The clue cell this constraint comes from
    pub clue: Position,
    /// Covered, unflagged neighbors in row-major order
    pub cells: Vec<Position>,
    /// Clue value minus flagged neighbors. Negative only on an inconsistent board.
    pub mines_required: i32,
}

impl Constraint {
    /// Whether the requirement can be met at all by its own cells.
    pub fn is_satisfiable(&self) -> bool {
        self.mines_required >= 0 && self.mines_required as usize <= self.cells.len()
    }
}

/// One constraint per revealed clue that still borders a covered cell.
pub fn constraints(board: &SolverBoard) -> Vec<Constraint> {
    let mut constraints = Vec::new();

    for pos in board.iter_positions() {
        let Some(SolverCell::Revealed(clue)) = board.get(pos) else {
            continue;
        };

        let mut cells = Vec::new();
        let mut flagged = 0;
        for npos in board.neighbors(pos) {
            match board.get(npos) {
                Some(SolverCell::Covered) => cells.push(npos),
                Some(SolverCell::Flagged) => flagged += 1,
                _ => {}
            }
        }

        // Only add constraints that still have unknown cells
        if !cells.is_empty() {
            constraints.push(Constraint {
                clue: pos,
                cells,
                mines_required: i32::from(clue) - flagged,
            });
        }
    }

    constraints
}

/// Covered cells adjacent to at least one revealed clue, row-major.
pub fn frontier(board: &SolverBoard) -> Vec<Position> {
    constraints(board)
        .into_iter()
        .flat_map(|constraint| constraint.cells)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Board, Puzzle};

    #[test]
    fn test_constraint_generation() {
        // [1|?]
        // [F|?]
        let board = Board::from_mines(2, 2, &[Position::new(1, 0)]).unwrap();
        let mut puzzle = Puzzle::new(board);
        puzzle.reveal(Position::new(0, 0)).unwrap();
        puzzle.flag(Position::new(1, 0)).unwrap();

        let constraints = constraints(&SolverBoard::new(&puzzle));

        assert_eq!(constraints.len(), 1);
        assert_eq!(constraints[0].clue, Position::new(0, 0));
        assert_eq!(
            constraints[0].cells,
            vec![Position::new(0, 1), Position::new(1, 1)]
        );
        assert_eq!(constraints[0].mines_required, 0);
    }

    #[test]
    fn test_frontier_excludes_interior_cells() {
        let board = Board::from_mines(1, 5, &[Position::new(0, 4)]).unwrap();
        let mut puzzle = Puzzle::new(board);
        puzzle.reveal(Position::new(0, 0)).unwrap();

        let frontier = frontier(&SolverBoard::new(&puzzle));
        assert_eq!(frontier, vec![Position::new(0, 1)]);
    }

    #[test]
    fn test_frontier_is_deduplicated() {
        let board = Board::from_mines(2, 3, &[Position::new(1, 1)]).unwrap();
        let mut puzzle = Puzzle::new(board);
        puzzle.reveal(Position::new(0, 0)).unwrap();
        puzzle.reveal(Position::new(0, 2)).unwrap();

        let frontier = frontier(&SolverBoard::new(&puzzle));
        assert_eq!(
            frontier,
            vec![
                Position::new(0, 1),
                Position::new(1, 0),
                Position::new(1, 1),
                Position::new(1, 2)
            ]
        );
    }
}
