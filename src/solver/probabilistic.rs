use std::collections::HashMap;

use super::constraint::{constraints, frontier};
use super::traits::{ProbabilisticSolver, ProbabilityMap, Solver};
use super::SolverBoard;
use crate::SolverError;

/// Widest frontier a `u64` assignment mask can hold.
pub const MAX_ENUMERABLE_FRONTIER: usize = 63;

/// Exact mine probabilities by enumerating every mine/safe assignment of the
/// frontier against all active clue constraints.
#[derive(Debug, Clone, Copy)]
pub struct EnumerationSolver {
    /// Largest frontier that will be enumerated; cost is `2^max_frontier`.
    pub max_frontier: usize,
}

impl Default for EnumerationSolver {
    fn default() -> Self {
        Self { max_frontier: 20 }
    }
}

impl EnumerationSolver {
    pub fn new(max_frontier: usize) -> Self {
        Self { max_frontier }
    }
}

impl Solver for EnumerationSolver {
    fn name(&self) -> &str {
        "Enumeration Solver"
    }
}

impl ProbabilisticSolver for EnumerationSolver {
    fn assess(&self, board: &SolverBoard) -> Result<ProbabilityMap, SolverError> {
        let frontier = frontier(board);
        let limit = self.max_frontier.min(MAX_ENUMERABLE_FRONTIER);
        if frontier.len() > limit {
            return Err(SolverError::FrontierTooLarge {
                size: frontier.len(),
                limit,
            });
        }

        let bit: HashMap<_, _> = frontier
            .iter()
            .enumerate()
            .map(|(idx, &pos)| (pos, idx))
            .collect();

        // Each constraint becomes (mask over the frontier, required mines)
        let masks: Vec<(u64, u32)> = constraints(board)
            .into_iter()
            .map(|constraint| {
                let mask = constraint
                    .cells
                    .iter()
                    .fold(0u64, |mask, pos| mask | (1u64 << bit[pos]));
                match u32::try_from(constraint.mines_required) {
                    Ok(required) => (mask, required),
                    Err(_) => {
                        log::warn!(
                            "Clue at {:?} has {} mines too many flagged around it",
                            constraint.clue,
                            -constraint.mines_required
                        );
                        // No assignment can satisfy a negative requirement
                        (mask, u32::MAX)
                    }
                }
            })
            .collect();

        let mut mine_counts = vec![0u64; frontier.len()];
        let mut total = 0u64;
        for assignment in 0..(1u64 << frontier.len()) {
            let valid = masks
                .iter()
                .all(|&(mask, required)| (assignment & mask).count_ones() == required);
            if !valid {
                continue;
            }

            total += 1;
            for (idx, count) in mine_counts.iter_mut().enumerate() {
                *count += (assignment >> idx) & 1;
            }
        }

        if total == 0 && !frontier.is_empty() {
            log::warn!(
                "No mine assignment satisfies the {} clue constraints on a frontier of {}",
                masks.len(),
                frontier.len()
            );
        }

        Ok(ProbabilityMap {
            mine_counts: frontier.into_iter().zip(mine_counts).collect(),
            total,
        })
    }
}
