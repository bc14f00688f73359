use super::probabilistic::MAX_ENUMERABLE_FRONTIER;
use crate::SolverError;

/// Tuning for [`super::SolverChain`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolverConfig {
    /// Largest frontier the probability estimator will enumerate
    pub max_frontier: usize,
    /// Largest local combination count the assumption solver will enumerate
    pub assumption_bound: u64,
    /// Random completions per rollout candidate
    pub rollout_trials: usize,
    /// Score rollout candidates on the rayon thread pool
    pub parallel_rollouts: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_frontier: 20,
            assumption_bound: 10,
            rollout_trials: 5,
            parallel_rollouts: true,
        }
    }
}

impl SolverConfig {
    pub fn with_max_frontier(mut self, max_frontier: usize) -> Self {
        self.max_frontier = max_frontier;
        self
    }

    pub fn with_assumption_bound(mut self, assumption_bound: u64) -> Self {
        self.assumption_bound = assumption_bound;
        self
    }

    pub fn with_rollout_trials(mut self, rollout_trials: usize) -> Self {
        self.rollout_trials = rollout_trials;
        self
    }

    pub fn with_parallel_rollouts(mut self, parallel_rollouts: bool) -> Self {
        self.parallel_rollouts = parallel_rollouts;
        self
    }

    pub fn validate(&self) -> Result<(), SolverError> {
        if self.max_frontier > MAX_ENUMERABLE_FRONTIER {
            return Err(SolverError::InvalidConfig(format!(
                "max_frontier {} exceeds {}",
                self.max_frontier, MAX_ENUMERABLE_FRONTIER
            )));
        }
        if self.rollout_trials == 0 {
            return Err(SolverError::InvalidConfig(
                "rollout_trials must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
