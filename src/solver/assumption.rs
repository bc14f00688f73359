use super::constraint::{constraints, Constraint};
use super::traits::{DeterministicResult, DeterministicSolver, Solver};
use super::SolverBoard;
use crate::{solver_test_suite, Position};
use itertools::Itertools;
use statrs::function::factorial::binomial;
use std::collections::HashSet;

/// Local fallback for frontiers too wide to enumerate: picks the single clue
/// with the fewest mine placements and keeps the neighbors that every locally
/// valid placement agrees on.
///
/// A placement is locally valid when it puts exactly the clue's remaining
/// mines among its covered neighbors and leaves every overlapping clue able to
/// reach its own count.
#[derive(Debug, Clone, Copy)]
pub struct AssumptionSolver {
    /// Largest combination count `C(covered, mines)` worth enumerating
    pub max_combinations: u64,
}

impl Default for AssumptionSolver {
    fn default() -> Self {
        Self {
            max_combinations: 10,
        }
    }
}

impl AssumptionSolver {
    pub fn new(max_combinations: u64) -> Self {
        Self { max_combinations }
    }

    /// The clue with the smallest combination count within the bound, first
    /// in row-major order on ties, along with that count.
    fn pick_constraint<'c>(
        &self,
        constraints: &'c [Constraint],
    ) -> Option<(f64, &'c Constraint)> {
        constraints
            .iter()
            .filter(|constraint| constraint.is_satisfiable())
            .map(|constraint| {
                let count = binomial(
                    constraint.cells.len() as u64,
                    constraint.mines_required as u64,
                );
                (count, constraint)
            })
            .filter(|&(count, _)| count <= self.max_combinations as f64)
            .min_by(|a, b| a.0.total_cmp(&b.0))
    }

    /// Checks a placement against one overlapping clue: the mines it puts in
    /// the overlap must not exceed that clue's count, and whatever is left
    /// must fit in that clue's cells outside the overlap.
    fn fits(pattern: &HashSet<Position>, chosen: &HashSet<Position>, other: &Constraint) -> bool {
        let (inside, outside): (Vec<&Position>, Vec<&Position>) =
            other.cells.iter().partition(|pos| chosen.contains(*pos));
        let placed = inside.iter().filter(|pos| pattern.contains(**pos)).count() as i32;
        let needed = other.mines_required - placed;
        needed >= 0 && needed as usize <= outside.len()
    }
}

impl Solver for AssumptionSolver {
    fn name(&self) -> &str {
        "Assumption Solver"
    }
}

impl DeterministicSolver for AssumptionSolver {
    fn solve(&self, board: &SolverBoard) -> DeterministicResult {
        let mut result = DeterministicResult::default();
        let constraints = constraints(board);
        let Some((combinations, chosen)) = self.pick_constraint(&constraints) else {
            log::debug!("No clue within {} combinations", self.max_combinations);
            return result;
        };
        let chosen_cells: HashSet<Position> = chosen.cells.iter().copied().collect();

        let overlapping: Vec<&Constraint> = constraints
            .iter()
            .filter(|other| other.clue != chosen.clue)
            .filter(|other| other.cells.iter().any(|pos| chosen_cells.contains(pos)))
            .collect();

        let mut always_mine = vec![true; chosen.cells.len()];
        let mut always_safe = vec![true; chosen.cells.len()];
        let mut valid_patterns = 0;

        for mines in chosen
            .cells
            .iter()
            .copied()
            .combinations(chosen.mines_required as usize)
        {
            let pattern: HashSet<Position> = mines.into_iter().collect();
            if !overlapping
                .iter()
                .all(|other| Self::fits(&pattern, &chosen_cells, other))
            {
                continue;
            }

            valid_patterns += 1;
            for (idx, pos) in chosen.cells.iter().enumerate() {
                if pattern.contains(pos) {
                    always_safe[idx] = false;
                } else {
                    always_mine[idx] = false;
                }
            }
        }

        if valid_patterns == 0 {
            log::warn!(
                "No valid placement around clue {:?}, constraints are contradictory",
                chosen.clue
            );
            return result;
        }

        for (idx, &pos) in chosen.cells.iter().enumerate() {
            if always_mine[idx] {
                result.mines.insert(pos);
            } else if always_safe[idx] {
                result.safe.insert(pos);
            }
        }

        log::debug!(
            "Assumed around {:?}: {} of {} placements valid, {} cells decided",
            chosen.clue,
            valid_patterns,
            combinations,
            result.mines.len() + result.safe.len()
        );
        result
    }
}

solver_test_suite!(AssumptionSolver::default(), deterministic);
