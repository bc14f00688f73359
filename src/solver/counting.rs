use super::board::{SolverBoard, SolverCell};
use super::traits::{DeterministicResult, DeterministicSolver, Solver};
use crate::{solver_test_suite, Position};

/// Implements basic counting rules for minesweeper solving:
/// - If a numbered cell has exactly as many hidden neighbors as its remaining mines, they must all be mines
/// - If a numbered cell has exactly as many flagged neighbors as its number, all other neighbors must be safe
///
/// Deductions feed back into later sweeps until nothing new is found.
#[derive(Debug, Default, Clone, Copy)]
pub struct CountingSolver;

impl CountingSolver {
    /// Propagates to a fixpoint on top of already `known` cells, returning
    /// only the new deductions.
    pub fn propagate_from(
        &self,
        board: &SolverBoard,
        known: &DeterministicResult,
    ) -> DeterministicResult {
        let mut found = DeterministicResult::default();

        loop {
            let mut sweep = DeterministicResult::default();
            for pos in board.iter_positions() {
                self.analyze_cell(board, pos, known, &found, &mut sweep);
            }

            let conflicts: Vec<Position> = sweep.mines.intersection(&sweep.safe).copied().collect();
            for pos in &conflicts {
                log::warn!("Contradictory deductions for {pos:?}, leaving it undecided");
                sweep.mines.remove(pos);
                sweep.safe.remove(pos);
            }

            if sweep.is_empty() {
                break;
            }
            found.mines.extend(sweep.mines);
            found.safe.extend(sweep.safe);
        }

        found
    }

    fn analyze_cell(
        &self,
        board: &SolverBoard,
        pos: Position,
        known: &DeterministicResult,
        found: &DeterministicResult,
        sweep: &mut DeterministicResult,
    ) {
        // Only analyze revealed cells with numbers
        let clue = match board.get(pos) {
            Some(SolverCell::Revealed(n)) => i32::from(n),
            _ => return,
        };

        let mut covered_positions = Vec::new();
        let mut flagged_count = 0;

        // Count flagged and covered neighbors, treating earlier deductions as settled
        for npos in board.neighbors(pos) {
            match board.get(npos) {
                Some(SolverCell::Flagged) => flagged_count += 1,
                Some(SolverCell::Covered) => {
                    if known.mines.contains(&npos) || found.mines.contains(&npos) {
                        flagged_count += 1;
                    } else if !known.safe.contains(&npos) && !found.safe.contains(&npos) {
                        covered_positions.push(npos);
                    }
                }
                _ => {}
            }
        }

        let remaining_mines = clue - flagged_count;
        if remaining_mines < 0 || remaining_mines as usize > covered_positions.len() {
            log::warn!(
                "Clue at {pos:?} needs {remaining_mines} mines among {} covered cells",
                covered_positions.len()
            );
            return;
        }
        if covered_positions.is_empty() {
            return;
        }

        // If number of flags equals cell number, all other covered neighbors must be safe
        if remaining_mines == 0 {
            sweep.safe.extend(covered_positions);
        // If remaining mines equals number of covered cells, they must all be mines
        } else if remaining_mines as usize == covered_positions.len() {
            sweep.mines.extend(covered_positions);
        }
    }
}

impl Solver for CountingSolver {
    fn name(&self) -> &str {
        "Counting Solver"
    }
}

impl DeterministicSolver for CountingSolver {
    fn solve(&self, board: &SolverBoard) -> DeterministicResult {
        self.propagate_from(board, &DeterministicResult::default())
    }
}

solver_test_suite!(CountingSolver, deterministic);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Board, Puzzle};

    /// Helper function to create a puzzle with known mine positions
    fn create_test_puzzle(rows: usize, cols: usize, mines: &[(i32, i32)]) -> Puzzle {
        let mines: Vec<Position> = mines.iter().map(|&p| p.into()).collect();
        Puzzle::new(Board::from_mines(rows, cols, &mines).unwrap())
    }

    #[test]
    fn test_zero_clears_neighbors() {
        let mut puzzle = create_test_puzzle(3, 3, &[(2, 2)]);
        puzzle.reveal(Position::new(0, 0)).unwrap();

        let result = CountingSolver.solve(&SolverBoard::new(&puzzle));

        assert!(result.mines.is_empty());
        assert_eq!(
            result.safe.into_iter().collect::<Vec<_>>(),
            vec![
                Position::new(0, 1),
                Position::new(1, 0),
                Position::new(1, 1)
            ]
        );
    }

    #[test]
    fn test_all_covered_are_mines() {
        // [0|1|?]
        let mut puzzle = create_test_puzzle(1, 3, &[(0, 2)]);
        puzzle.reveal(Position::new(0, 0)).unwrap();
        puzzle.reveal(Position::new(0, 1)).unwrap();

        let result = CountingSolver.solve(&SolverBoard::new(&puzzle));

        assert!(result.safe.is_empty());
        assert!(result.mines.contains(&Position::new(0, 2)));
    }

    #[test]
    fn test_deductions_chain_through_sweeps() {
        // [?|1|0]
        // [?|?|?] mine at (1,0)
        let mut puzzle = create_test_puzzle(2, 3, &[(1, 0)]);
        puzzle.reveal(Position::new(0, 2)).unwrap();
        puzzle.reveal(Position::new(0, 1)).unwrap();

        let result = CountingSolver.solve(&SolverBoard::new(&puzzle));

        // (0,2)=0 clears (1,1) and (1,2); then (0,1)=1 with only (0,0) and
        // (1,0) left still has two candidates, so nothing more is forced.
        assert!(result.safe.contains(&Position::new(1, 1)));
        assert!(result.safe.contains(&Position::new(1, 2)));
        assert!(result.mines.is_empty());
    }

    #[test]
    fn test_second_sweep_uses_first_sweep_mines() {
        // [1|?|?]
        // [1|1|1] mine at (0,1)
        let mut puzzle = create_test_puzzle(2, 3, &[(0, 1)]);
        puzzle.reveal(Position::new(1, 0)).unwrap();
        puzzle.reveal(Position::new(1, 1)).unwrap();
        puzzle.reveal(Position::new(0, 0)).unwrap();
        puzzle.reveal(Position::new(1, 2)).unwrap();

        let result = CountingSolver.solve(&SolverBoard::new(&puzzle));

        // (0,0) forces the mine at (0,1); the next sweep then clears (0,2).
        assert_eq!(result.mines.into_iter().collect::<Vec<_>>(), vec![Position::new(0, 1)]);
        assert_eq!(result.safe.into_iter().collect::<Vec<_>>(), vec![Position::new(0, 2)]);
    }

    #[test]
    fn test_idempotent_on_own_result() {
        let mut puzzle = create_test_puzzle(2, 3, &[(0, 1)]);
        for pos in [(0, 0), (1, 0), (1, 1), (1, 2)] {
            puzzle.reveal(pos.into()).unwrap();
        }

        let board = SolverBoard::new(&puzzle);
        let first = CountingSolver.solve(&board);
        assert!(!first.is_empty());

        let second = CountingSolver.propagate_from(&board, &first);
        assert!(second.is_empty(), "Re-running on settled cells must find nothing");
    }

    #[test]
    fn test_flags_reduce_requirement() {
        let mut puzzle = create_test_puzzle(1, 3, &[(0, 0)]);
        puzzle.reveal(Position::new(0, 1)).unwrap();
        puzzle.flag(Position::new(0, 0)).unwrap();

        let result = CountingSolver.solve(&SolverBoard::new(&puzzle));

        assert!(result.mines.is_empty());
        assert!(result.safe.contains(&Position::new(0, 2)));
    }

    #[test]
    fn test_nothing_to_do_on_fresh_board() {
        let puzzle = create_test_puzzle(4, 4, &[(1, 1)]);
        assert!(CountingSolver.solve(&SolverBoard::new(&puzzle)).is_empty());
    }
}
