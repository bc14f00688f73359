mod assumption;
mod board;
mod chain;
mod config;
mod constraint;
mod counting;
mod probabilistic;
mod rollout;
mod traits;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use assumption::AssumptionSolver;
pub use board::{SolverBoard, SolverCell};
pub use chain::{Justification, SolveReport, SolveState, SolverChain, SolverMove};
pub use config::SolverConfig;
pub use constraint::{constraints, frontier, Constraint};
pub use counting::CountingSolver;
pub use probabilistic::{EnumerationSolver, MAX_ENUMERABLE_FRONTIER};
pub use rollout::RolloutSelector;
pub use traits::{
    DeterministicResult, DeterministicSolver, ProbabilisticSolver, ProbabilityMap, Solver,
    SolverAction,
};
