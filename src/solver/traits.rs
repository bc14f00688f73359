use super::board::SolverBoard;
use crate::{Position, SolverError};
use itertools::Itertools;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolverAction {
    Reveal(Position),
    Flag(Position),
}

impl SolverAction {
    pub fn position(&self) -> Position {
        match self {
            SolverAction::Reveal(pos) | SolverAction::Flag(pos) => *pos,
        }
    }
}

/// Represents positions that a solver has determined to be mines or safe
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeterministicResult {
    /// Positions that are definitely mines
    pub mines: BTreeSet<Position>,
    /// Positions that are definitely safe
    pub safe: BTreeSet<Position>,
}

impl DeterministicResult {
    pub fn is_empty(&self) -> bool {
        self.mines.is_empty() && self.safe.is_empty()
    }

    pub fn is_known(&self, pos: &Position) -> bool {
        self.mines.contains(pos) || self.safe.contains(pos)
    }

    /// Flags first, then reveals, each in row-major order.
    pub fn actions(&self) -> Vec<SolverAction> {
        self.mines
            .iter()
            .map(|&pos| SolverAction::Flag(pos))
            .chain(self.safe.iter().map(|&pos| SolverAction::Reveal(pos)))
            .collect()
    }
}

/// Exact mine probabilities over the frontier, as counts of valid
/// assignments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProbabilityMap {
    /// Frontier cells with the number of valid assignments that make them a mine
    pub mine_counts: Vec<(Position, u64)>,
    /// Number of valid assignments
    pub total: u64,
}

impl ProbabilityMap {
    pub fn is_empty(&self) -> bool {
        self.mine_counts.is_empty()
    }

    /// Mine probability of a frontier cell. Zero for every cell when no
    /// assignment is valid.
    pub fn probability(&self, pos: Position) -> Option<f64> {
        self.mine_counts
            .iter()
            .find(|(p, _)| *p == pos)
            .map(|&(_, count)| self.ratio(count))
    }

    pub fn probabilities(&self) -> Vec<(Position, f64)> {
        self.mine_counts
            .iter()
            .map(|&(pos, count)| (pos, self.ratio(count)))
            .collect()
    }

    fn ratio(&self, count: u64) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            count as f64 / self.total as f64
        }
    }

    /// Cells that are a mine in every valid assignment.
    pub fn certain_mines(&self) -> Vec<Position> {
        if self.total == 0 {
            return Vec::new();
        }
        self.mine_counts
            .iter()
            .filter(|&&(_, count)| count == self.total)
            .map(|&(pos, _)| pos)
            .collect()
    }

    /// Every cell sharing the lowest mine probability.
    pub fn safest(&self) -> Vec<Position> {
        self.mine_counts
            .iter()
            .min_set_by_key(|&&(_, count)| count)
            .into_iter()
            .map(|&(pos, _)| pos)
            .collect()
    }
}

/// Base trait for all solvers
pub trait Solver {
    fn name(&self) -> &str;
}

/// Trait for solvers that make deterministic decisions
pub trait DeterministicSolver: Solver {
    fn solve(&self, board: &SolverBoard) -> DeterministicResult;
}

/// Trait for solvers that make probabilistic decisions
pub trait ProbabilisticSolver: Solver {
    /// Fails with [`SolverError::FrontierTooLarge`] when the assessment would
    /// exceed the solver's budget.
    fn assess(&self, board: &SolverBoard) -> Result<ProbabilityMap, SolverError>;
}

#[doc(hidden)]
#[macro_export]
macro_rules! solver_test_suite {
    ($solver:expr, deterministic) => {
        #[cfg(test)]
        mod solver_tests {
            use super::*;
            use $crate::solver::test_utils::{
                validate_deterministic_solver, TestBoardConfig, TestBoardGenerator,
            };
            use $crate::solver::{DeterministicSolver, Solver, SolverBoard};

            #[test]
            fn test_deterministic_consistency() {
                let solver = $solver;
                let mut generator = TestBoardGenerator::with_seed(TestBoardConfig::default(), 3);

                for puzzle in generator.generate_batch(50) {
                    let result = solver.solve(&SolverBoard::new(&puzzle));
                    // No overlap between mines and safe positions
                    assert!(result.mines.is_disjoint(&result.safe));
                }
            }

            #[test]
            fn test_deterministic_correctness() {
                let solver = $solver;
                let mut generator = TestBoardGenerator::with_seed(TestBoardConfig::default(), 11);

                for (idx, puzzle) in generator.generate_batch(100).iter().enumerate() {
                    assert!(
                        validate_deterministic_solver(&solver, puzzle),
                        "{} made an unsound deduction on board {}",
                        solver.name(),
                        idx
                    );
                }
            }
        }
    };
}
