use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use super::traits::{
    DeterministicResult, DeterministicSolver, ProbabilisticSolver, SolverAction,
};
use super::{
    AssumptionSolver, CountingSolver, EnumerationSolver, RolloutSelector, SolverBoard,
    SolverConfig,
};
use crate::{Action, MoveOutcome, Puzzle, SolverError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveState {
    Solving,
    Won,
    Lost,
    /// No component produced a move on an unfinished board
    Stuck,
}

/// Which component decided a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Justification {
    Propagation,
    CertainMine,
    LowestProbability,
    Assumption,
    Rollout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolverMove {
    pub action: SolverAction,
    pub justification: Justification,
}

impl SolverMove {
    fn tagged(result: &DeterministicResult, justification: Justification) -> Vec<SolverMove> {
        result
            .actions()
            .into_iter()
            .map(|action| SolverMove {
                action,
                justification,
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolveReport {
    pub state: SolveState,
    /// Every move applied, in order
    pub moves: Vec<SolverMove>,
    pub cycles: usize,
}

/// Plays a puzzle to the end, trying each component in turn every cycle:
/// propagation, exact probabilities, local assumptions, then rollouts.
pub struct SolverChain<R> {
    counting: CountingSolver,
    enumeration: EnumerationSolver,
    assumption: AssumptionSolver,
    rollout: RolloutSelector,
    rng: R,
}

impl SolverChain<StdRng> {
    pub fn seeded(config: SolverConfig, seed: u64) -> Result<Self, SolverError> {
        Self::new(config, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> SolverChain<R> {
    pub fn new(config: SolverConfig, rng: R) -> Result<Self, SolverError> {
        config.validate()?;
        Ok(Self {
            counting: CountingSolver,
            enumeration: EnumerationSolver::new(config.max_frontier),
            assumption: AssumptionSolver::new(config.assumption_bound),
            rollout: RolloutSelector::new(config.rollout_trials, config.parallel_rollouts),
            rng,
        })
    }

    /// Decides the moves of one cycle without applying them.
    pub fn plan(&mut self, puzzle: &Puzzle) -> Vec<SolverMove> {
        let board = SolverBoard::new(puzzle);

        let forced = self.counting.solve(&board);
        if !forced.is_empty() {
            log::debug!(
                "Propagation: {} mines, {} safe",
                forced.mines.len(),
                forced.safe.len()
            );
            return SolverMove::tagged(&forced, Justification::Propagation);
        }

        match self.enumeration.assess(&board) {
            Ok(map) => {
                let mines = map.certain_mines();
                if !mines.is_empty() {
                    log::debug!("Enumeration: {} certain mines", mines.len());
                    return mines
                        .into_iter()
                        .map(|pos| SolverMove {
                            action: SolverAction::Flag(pos),
                            justification: Justification::CertainMine,
                        })
                        .collect();
                }

                if let Some(&pos) = map.safest().choose(&mut self.rng) {
                    log::debug!(
                        "Enumeration: revealing {pos:?} at p={:.3}",
                        map.probability(pos).unwrap_or_default()
                    );
                    return vec![SolverMove {
                        action: SolverAction::Reveal(pos),
                        justification: Justification::LowestProbability,
                    }];
                }
            }
            Err(err) => {
                log::debug!("{err}, falling back to local assumptions");
                let assumed = self.assumption.solve(&board);
                if !assumed.is_empty() {
                    return SolverMove::tagged(&assumed, Justification::Assumption);
                }
            }
        }

        match self.rollout.select(&board, &mut self.rng) {
            Some(pos) => {
                log::debug!("Rollout: revealing {pos:?}");
                vec![SolverMove {
                    action: SolverAction::Reveal(pos),
                    justification: Justification::Rollout,
                }]
            }
            None => Vec::new(),
        }
    }

    /// Applies moves in order, stopping at the first mine or once solved.
    pub fn execute(
        &self,
        puzzle: &mut Puzzle,
        moves: &[SolverMove],
        applied: &mut Vec<SolverMove>,
    ) -> SolveState {
        for mv in moves {
            let (action, pos) = match mv.action {
                SolverAction::Reveal(pos) => (Action::Reveal, pos),
                SolverAction::Flag(pos) => (Action::Flag, pos),
            };

            match puzzle.apply_move(action, pos) {
                Ok(outcome) => {
                    log::trace!("{:?} {pos:?} ({:?}) -> {outcome}", action, mv.justification);
                    applied.push(*mv);
                    if outcome == MoveOutcome::HitMine {
                        return SolveState::Lost;
                    }
                }
                Err(err) => log::warn!("Skipping {:?}: {err}", mv.action),
            }

            if puzzle.is_solved() {
                return SolveState::Won;
            }
        }
        SolveState::Solving
    }

    /// Runs one cycle. Propagation keeps going on the cells it uncovers until
    /// it runs dry, all within the same cycle.
    pub fn step(&mut self, puzzle: &mut Puzzle, applied: &mut Vec<SolverMove>) -> SolveState {
        if let Some(state) = terminal_state(puzzle) {
            return state;
        }

        let mut moves = self.plan(puzzle);
        if moves.is_empty() {
            log::warn!("No component produced a move");
            return SolveState::Stuck;
        }

        loop {
            let propagated = moves
                .first()
                .is_some_and(|mv| mv.justification == Justification::Propagation);

            let state = self.execute(puzzle, &moves, applied);
            if state != SolveState::Solving || !propagated {
                return state;
            }

            let forced = self.counting.solve(&SolverBoard::new(puzzle));
            if forced.is_empty() {
                return SolveState::Solving;
            }
            moves = SolverMove::tagged(&forced, Justification::Propagation);
        }
    }

    /// Plays until the puzzle is won, lost, or no move is left.
    pub fn solve(&mut self, puzzle: &mut Puzzle) -> SolveReport {
        let (rows, cols) = puzzle.dimensions();
        let max_cycles = rows * cols;
        let mut moves = Vec::new();
        let mut cycles = 0;

        let mut state = terminal_state(puzzle).unwrap_or(SolveState::Solving);
        while state == SolveState::Solving {
            if cycles == max_cycles {
                log::warn!("Gave up after {cycles} cycles");
                state = SolveState::Stuck;
                break;
            }
            cycles += 1;
            state = self.step(puzzle, &mut moves);
        }

        log::debug!(
            "Finished as {state:?} after {cycles} cycles, {} moves",
            moves.len()
        );
        SolveReport {
            state,
            moves,
            cycles,
        }
    }
}

fn terminal_state(puzzle: &Puzzle) -> Option<SolveState> {
    if puzzle.is_lost() {
        Some(SolveState::Lost)
    } else if puzzle.is_solved() {
        Some(SolveState::Won)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Board, Position};

    fn create_test_puzzle(rows: usize, cols: usize, mines: &[(i32, i32)]) -> Puzzle {
        let mines: Vec<Position> = mines.iter().map(|&p| p.into()).collect();
        Puzzle::new(Board::from_mines(rows, cols, &mines).unwrap())
    }

    #[test]
    fn test_propagation_takes_priority() {
        let mut puzzle = create_test_puzzle(1, 3, &[(0, 2)]);
        puzzle.reveal(Position::new(0, 0)).unwrap();

        let mut chain = SolverChain::seeded(SolverConfig::default(), 1).unwrap();
        let moves = chain.plan(&puzzle);

        assert_eq!(
            moves,
            vec![SolverMove {
                action: SolverAction::Reveal(Position::new(0, 1)),
                justification: Justification::Propagation,
            }]
        );
    }

    #[test]
    fn test_enumeration_reveals_safest() {
        // [1|1|?]
        // [?|?|?] (0,2) and (1,2) are safe but only the full enumeration sees it
        let mut puzzle = create_test_puzzle(2, 3, &[(1, 0)]);
        puzzle.reveal(Position::new(0, 0)).unwrap();
        puzzle.reveal(Position::new(0, 1)).unwrap();

        let mut chain = SolverChain::seeded(SolverConfig::default(), 2).unwrap();
        let moves = chain.plan(&puzzle);

        assert_eq!(moves.len(), 1);
        assert_eq!(moves[0].justification, Justification::LowestProbability);
        assert!(matches!(
            moves[0].action,
            SolverAction::Reveal(pos) if pos == Position::new(0, 2) || pos == Position::new(1, 2)
        ));
    }

    #[test]
    fn test_certain_mines_flagged_before_safest_reveal() {
        // [1|2|1]
        // [?|?|?] the 1-2-1 pins mines to both ends; counting alone sees nothing
        let mut puzzle = create_test_puzzle(2, 3, &[(1, 0), (1, 2)]);
        for col in 0..3 {
            puzzle.reveal(Position::new(0, col)).unwrap();
        }
        assert!(CountingSolver.solve(&SolverBoard::new(&puzzle)).is_empty());

        let mut chain = SolverChain::seeded(SolverConfig::default(), 9).unwrap();
        let moves = chain.plan(&puzzle);

        assert_eq!(
            moves,
            vec![
                SolverMove {
                    action: SolverAction::Flag(Position::new(1, 0)),
                    justification: Justification::CertainMine,
                },
                SolverMove {
                    action: SolverAction::Flag(Position::new(1, 2)),
                    justification: Justification::CertainMine,
                },
            ]
        );
    }

    #[test]
    fn test_assumption_used_when_frontier_too_large() {
        let mut puzzle = create_test_puzzle(2, 4, &[(0, 0), (0, 3), (1, 1), (1, 3)]);
        puzzle.flag(Position::new(0, 0)).unwrap();
        puzzle.flag(Position::new(0, 3)).unwrap();
        puzzle.reveal(Position::new(0, 1)).unwrap();
        puzzle.reveal(Position::new(0, 2)).unwrap();

        let config = SolverConfig::default().with_max_frontier(2);
        let mut chain = SolverChain::seeded(config, 3).unwrap();
        let moves = chain.plan(&puzzle);

        assert_eq!(
            moves,
            vec![SolverMove {
                action: SolverAction::Reveal(Position::new(1, 0)),
                justification: Justification::Assumption,
            }]
        );
    }

    #[test]
    fn test_rollout_when_nothing_else_applies() {
        let mut puzzle = create_test_puzzle(3, 3, &[(0, 0)]);
        puzzle.reveal(Position::new(1, 1)).unwrap();

        let config = SolverConfig::default().with_max_frontier(4);
        let mut chain = SolverChain::seeded(config, 4).unwrap();

        for _ in 0..3 {
            let moves = chain.plan(&puzzle);
            assert_eq!(moves.len(), 1);
            assert_eq!(moves[0].justification, Justification::Rollout);
            assert!(matches!(moves[0].action, SolverAction::Reveal(_)));
        }
    }

    #[test]
    fn test_hit_mine_stops_execution() {
        let mut puzzle = create_test_puzzle(1, 3, &[(0, 0)]);
        let chain = SolverChain::seeded(SolverConfig::default(), 5).unwrap();
        let moves = [
            SolverMove {
                action: SolverAction::Reveal(Position::new(0, 0)),
                justification: Justification::Rollout,
            },
            SolverMove {
                action: SolverAction::Reveal(Position::new(0, 2)),
                justification: Justification::Rollout,
            },
        ];

        let mut applied = Vec::new();
        assert_eq!(chain.execute(&mut puzzle, &moves, &mut applied), SolveState::Lost);
        assert_eq!(applied.len(), 1);
        assert_eq!(
            puzzle.visibility(Position::new(0, 2)),
            Some(crate::Visibility::Covered)
        );
    }

    #[test]
    fn test_solve_finished_board() {
        let mut puzzle = Puzzle::new("1 1 1\n*\n".parse().unwrap());
        let mut chain = SolverChain::seeded(SolverConfig::default(), 6).unwrap();
        let report = chain.solve(&mut puzzle);

        assert_eq!(report.state, SolveState::Won);
        assert_eq!(report.cycles, 0);
        assert!(report.moves.is_empty());
    }

    #[test]
    fn test_solve_is_reproducible() {
        let mut rng = StdRng::seed_from_u64(7);
        let board = Board::random(6, 6, 6, &mut rng).unwrap();

        let mut first = Puzzle::new(board.clone());
        let mut second = Puzzle::new(board);
        let a = SolverChain::seeded(SolverConfig::default(), 8)
            .unwrap()
            .solve(&mut first);
        let b = SolverChain::seeded(SolverConfig::default(), 8)
            .unwrap()
            .solve(&mut second);

        assert_eq!(a, b);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = SolverConfig::default().with_rollout_trials(0);
        assert!(SolverChain::seeded(config, 0).is_err());
    }
}
