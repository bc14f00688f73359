use super::board::{SolverBoard, SolverCell};
use super::constraint::{constraints, Constraint};
use crate::{Board, CellValue, Position, Puzzle};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use std::collections::HashSet;

/// Layouts drawn per trial before settling for the closest one.
const MAX_LAYOUT_ATTEMPTS: usize = 256;

/// Monte Carlo guess selection: plays random completions from each covered
/// cell and keeps the one that wins most often.
///
/// Completions run against hypothetical mine layouts sampled from what the
/// player can see, one layout per trial, shared by every candidate. Each
/// candidate also draws its own seed from the caller's RNG before any trial
/// runs, so sequential and parallel scoring agree for a given seed.
#[derive(Debug, Clone, Copy)]
pub struct RolloutSelector {
    pub trials: usize,
    pub parallel: bool,
}

impl Default for RolloutSelector {
    fn default() -> Self {
        Self {
            trials: 5,
            parallel: true,
        }
    }
}

impl RolloutSelector {
    pub fn new(trials: usize, parallel: bool) -> Self {
        Self { trials, parallel }
    }

    /// Win counts for every covered, unflagged cell in row-major order.
    pub fn scores<R: Rng + ?Sized>(
        &self,
        board: &SolverBoard,
        rng: &mut R,
    ) -> Vec<(Position, usize)> {
        let covered: Vec<Position> = board
            .iter_positions()
            .filter(|&pos| board.get(pos) == Some(SolverCell::Covered))
            .collect();
        if covered.is_empty() {
            return Vec::new();
        }

        let worlds: Vec<Puzzle> = (0..self.trials)
            .filter_map(|_| Self::sample_world(board, &covered, rng))
            .collect();

        let seeded: Vec<(Position, u64)> = covered.iter().map(|&pos| (pos, rng.gen())).collect();

        let score = |&(pos, seed): &(Position, u64)| {
            let mut trial_rng = StdRng::seed_from_u64(seed);
            let wins = worlds
                .iter()
                .filter(|world| Self::playout(world, pos, &mut trial_rng))
                .count();
            (pos, wins)
        };

        if self.parallel {
            seeded.par_iter().map(score).collect()
        } else {
            seeded.iter().map(score).collect()
        }
    }

    /// The candidate with the most wins; the first one on ties.
    pub fn select<R: Rng + ?Sized>(&self, board: &SolverBoard, rng: &mut R) -> Option<Position> {
        let scores = self.scores(board, rng);
        let mut best: Option<(Position, usize)> = None;
        for (pos, wins) in scores {
            log::trace!("Rollout {pos:?}: {wins}/{} wins", self.trials);
            if best.map_or(true, |(_, top)| wins > top) {
                best = Some((pos, wins));
            }
        }
        best.map(|(pos, _)| pos)
    }

    /// Draws a mine layout for the covered cells and replays the visible
    /// progress on it. Flags count as mines; the remaining mines are spread
    /// uniformly. Layouts that break a revealed clue are redrawn, and after
    /// too many attempts the one breaking the fewest clues is used.
    fn sample_world<R: Rng + ?Sized>(
        board: &SolverBoard,
        covered: &[Position],
        rng: &mut R,
    ) -> Option<Puzzle> {
        let flagged: Vec<Position> = board
            .iter_positions()
            .filter(|&pos| board.get(pos) == Some(SolverCell::Flagged))
            .collect();
        let hidden_mines = board
            .total_mines()
            .saturating_sub(flagged.len())
            .min(covered.len());
        let constraints = constraints(board);

        let mut best: Option<(usize, HashSet<Position>)> = None;
        for _ in 0..MAX_LAYOUT_ATTEMPTS {
            let layout: HashSet<Position> =
                rand::seq::index::sample(rng, covered.len(), hidden_mines)
                    .into_iter()
                    .map(|idx| covered[idx])
                    .collect();
            let broken = constraints
                .iter()
                .filter(|constraint| !Self::satisfies(constraint, &layout))
                .count();
            if best.as_ref().map_or(true, |(fewest, _)| broken < *fewest) {
                best = Some((broken, layout));
            }
            if broken == 0 {
                break;
            }
        }

        let (broken, layout) = best?;
        if broken > 0 {
            log::trace!("Sampled layout still breaks {broken} clues");
        }

        let (rows, cols) = board.dimensions();
        let mines: Vec<Position> = flagged.iter().copied().chain(layout).collect();
        let world = match Board::from_mines(rows, cols, &mines) {
            Ok(world) => world,
            Err(err) => {
                log::warn!("Could not build a sampled layout: {err}");
                return None;
            }
        };

        let mut puzzle = Puzzle::new(world);
        for pos in board.iter_positions() {
            let replayed = match board.get(pos) {
                Some(SolverCell::Revealed(_)) => puzzle.reveal(pos).map(|_| ()),
                Some(SolverCell::Flagged) => puzzle.flag(pos),
                _ => Ok(()),
            };
            if let Err(err) = replayed {
                log::warn!("Could not replay {pos:?} on a sampled layout: {err}");
                return None;
            }
        }
        Some(puzzle)
    }

    fn satisfies(constraint: &Constraint, layout: &HashSet<Position>) -> bool {
        let placed = constraint
            .cells
            .iter()
            .filter(|pos| layout.contains(pos))
            .count();
        i32::try_from(placed).is_ok_and(|placed| placed == constraint.mines_required)
    }

    /// One random completion opening on `first`. Revealing the remaining cells
    /// in a shuffled order is the same as picking a uniformly random covered
    /// cell at every step.
    fn playout<R: Rng + ?Sized>(world: &Puzzle, first: Position, rng: &mut R) -> bool {
        let mut sim = world.clone();
        let mut order: Vec<Position> = sim
            .covered_positions()
            .into_iter()
            .filter(|&pos| pos != first)
            .collect();
        order.shuffle(rng);

        for pos in std::iter::once(first).chain(order) {
            match sim.reveal(pos) {
                Ok(Some(CellValue::Mine)) | Err(_) => return false,
                _ => {}
            }
            if sim.is_solved() {
                return true;
            }
        }
        false
    }
}
