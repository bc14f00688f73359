use super::{
    board::SolverBoard,
    chain::{Justification, SolverChain},
    traits::{DeterministicSolver, ProbabilisticSolver, SolverAction},
};
use crate::{Board, Position, Puzzle, SolverError, Visibility};
use rand::prelude::*;

/// Configuration for test board generation
#[derive(Debug, Clone)]
pub struct TestBoardConfig {
    pub rows: usize,
    pub cols: usize,
    pub mine_density: f64,
    pub revealed_percentage: f64,
}

impl Default for TestBoardConfig {
    fn default() -> Self {
        Self {
            rows: 8,
            cols: 8,
            mine_density: 0.15,
            revealed_percentage: 0.3,
        }
    }
}

/// Generates puzzles part way through a game: some safe cells revealed, no
/// mine hit, and at least one safe cell still covered.
pub struct TestBoardGenerator {
    config: TestBoardConfig,
    rng: StdRng,
}

impl TestBoardGenerator {
    pub fn new(config: TestBoardConfig) -> Self {
        Self {
            config,
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_seed(config: TestBoardConfig, seed: u64) -> Self {
        Self {
            config,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn generate(&mut self) -> Puzzle {
        let total = self.config.rows * self.config.cols;
        let mines_count = (total as f64 * self.config.mine_density) as usize;
        let board = Board::random(self.config.rows, self.config.cols, mines_count, &mut self.rng)
            .expect("test board dimensions must be non-zero");

        let mut safe: Vec<Position> = board
            .iter_positions()
            .filter(|&pos| !board.is_mine(pos))
            .collect();
        safe.shuffle(&mut self.rng);

        let cells_to_reveal = ((total as f64 * self.config.revealed_percentage) as usize)
            .min(safe.len().saturating_sub(1));

        let mut puzzle = Puzzle::new(board);
        for &pos in &safe[..cells_to_reveal] {
            puzzle.reveal(pos).unwrap();
        }
        puzzle
    }

    /// Generates multiple test cases
    pub fn generate_batch(&mut self, count: usize) -> Vec<Puzzle> {
        (0..count).map(|_| self.generate()).collect()
    }
}

fn is_mine(puzzle: &Puzzle, pos: Position) -> bool {
    puzzle.board().is_mine(pos)
}

/// Checks every deduction against the hidden board.
pub fn validate_deterministic_solver<S: DeterministicSolver>(solver: &S, puzzle: &Puzzle) -> bool {
    let result = solver.solve(&SolverBoard::new(puzzle));

    // Verify that identified mines are actually mines
    for &pos in &result.mines {
        if !is_mine(puzzle, pos) {
            println!(
                "Solver {} incorrectly identified safe position {:?} as mine",
                solver.name(),
                pos
            );
            return false;
        }
    }

    // Verify that identified safe positions are actually safe
    for &pos in &result.safe {
        if is_mine(puzzle, pos) {
            println!(
                "Solver {} incorrectly identified mine {:?} as safe",
                solver.name(),
                pos
            );
            return false;
        }
    }

    true
}

/// Probabilities must lie in `[0, 1]` and certainties must be right. An
/// oversized frontier is not a failure.
pub fn validate_probabilistic_solver<S: ProbabilisticSolver>(solver: &S, puzzle: &Puzzle) -> bool {
    let map = match solver.assess(&SolverBoard::new(puzzle)) {
        Ok(map) => map,
        Err(SolverError::FrontierTooLarge { .. }) => return true,
        Err(err) => {
            println!("Solver {} failed: {}", solver.name(), err);
            return false;
        }
    };

    if !map.is_empty() && map.total == 0 {
        println!("Solver {} found no consistent assignment", solver.name());
        return false;
    }

    for (pos, prob) in map.probabilities() {
        if !(0.0..=1.0).contains(&prob) {
            println!(
                "Solver {} produced invalid probability {} for {:?}",
                solver.name(),
                prob,
                pos
            );
            return false;
        }
        if prob == 1.0 && !is_mine(puzzle, pos) {
            println!("Solver {} is certain {:?} is a mine", solver.name(), pos);
            return false;
        }
        if prob == 0.0 && is_mine(puzzle, pos) {
            println!("Solver {} is certain {:?} is safe", solver.name(), pos);
            return false;
        }
    }

    true
}

/// Plans one cycle and checks it: justified moves must be correct and
/// guesses must target covered cells.
pub fn validate_solver_chain<R: Rng>(chain: &mut SolverChain<R>, puzzle: &Puzzle) -> bool {
    for mv in chain.plan(puzzle) {
        let pos = mv.action.position();
        if puzzle.visibility(pos) != Some(Visibility::Covered) {
            println!("Chain targeted {:?} which is not covered", pos);
            return false;
        }

        let guess = matches!(
            mv.justification,
            Justification::LowestProbability | Justification::Rollout
        );
        let wrong = match mv.action {
            SolverAction::Flag(_) => !is_mine(puzzle, pos),
            SolverAction::Reveal(_) => is_mine(puzzle, pos),
        };
        if wrong && !guess {
            println!(
                "Chain made a wrong {:?} move {:?}",
                mv.justification, mv.action
            );
            return false;
        }
    }

    true
}
