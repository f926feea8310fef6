//! Search configuration.

use std::time::Duration;

use thiserror::Error;

use crate::constants::{
    DEFAULT_EXPLORATION, DEFAULT_ITERATIONS, DEFAULT_MAX_ROLLOUT_DEPTH, DEFAULT_ROLLOUT_NOISE,
    DEFAULT_TIME_LIMIT_SECS,
};

/// Rejected search parameters.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("exploration constant must be finite and non-negative (got {0})")]
    Exploration(f64),

    #[error("rollout noise must be a probability in [0, 1] (got {0})")]
    RolloutNoise(f64),

    #[error("iteration cap must be at least 1")]
    NoIterations,
}

/// Parameters of one MCTS search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    /// Maximum number of selection/expansion/rollout/backpropagation rounds.
    pub iterations: usize,

    /// UCB1 exploration constant `C`.
    pub exploration: f64,

    /// Maximum number of turns played out in a rollout before the
    /// position is judged by the static evaluator.
    pub max_rollout_depth: usize,

    /// Wall-clock budget. Checked before each iteration, never mid-rollout.
    pub time_limit: Duration,

    /// Probability that a rollout turn is a uniformly random candidate
    /// instead of the greedy one.
    pub rollout_noise: f64,

    /// Share statistics between tree nodes that reach the same position.
    pub use_transpositions: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            exploration: DEFAULT_EXPLORATION,
            max_rollout_depth: DEFAULT_MAX_ROLLOUT_DEPTH,
            time_limit: Duration::from_secs(DEFAULT_TIME_LIMIT_SECS),
            rollout_noise: DEFAULT_ROLLOUT_NOISE,
            use_transpositions: false,
        }
    }
}

impl SearchConfig {
    /// Small, quick searches for tests and demos.
    pub fn for_testing() -> Self {
        Self {
            iterations: 200,
            max_rollout_depth: 6,
            time_limit: Duration::from_secs(1),
            ..Self::default()
        }
    }

    pub fn with_iterations(mut self, n: usize) -> Self {
        self.iterations = n;
        self
    }

    pub fn with_exploration(mut self, c: f64) -> Self {
        self.exploration = c;
        self
    }

    pub fn with_max_rollout_depth(mut self, depth: usize) -> Self {
        self.max_rollout_depth = depth;
        self
    }

    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = limit;
        self
    }

    pub fn with_rollout_noise(mut self, p: f64) -> Self {
        self.rollout_noise = p;
        self
    }

    pub fn with_transpositions(mut self, enabled: bool) -> Self {
        self.use_transpositions = enabled;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.exploration.is_finite() || self.exploration < 0.0 {
            return Err(ConfigError::Exploration(self.exploration));
        }
        if !(0.0..=1.0).contains(&self.rollout_noise) {
            return Err(ConfigError::RolloutNoise(self.rollout_noise));
        }
        if self.iterations == 0 {
            return Err(ConfigError::NoIterations);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = SearchConfig::default();
        assert_eq!(config.iterations, 100_000);
        assert_eq!(config.time_limit, Duration::from_secs(4));
        assert!(!config.use_transpositions);
        assert!(config.validate().is_ok());
        assert!(SearchConfig::for_testing().validate().is_ok());
    }

    #[test]
    fn test_builders() {
        let config = SearchConfig::default()
            .with_iterations(10)
            .with_exploration(0.5)
            .with_max_rollout_depth(3)
            .with_time_limit(Duration::ZERO)
            .with_rollout_noise(0.0)
            .with_transpositions(true);
        assert_eq!(config.iterations, 10);
        assert_eq!(config.exploration, 0.5);
        assert_eq!(config.max_rollout_depth, 3);
        assert_eq!(config.time_limit, Duration::ZERO);
        assert_eq!(config.rollout_noise, 0.0);
        assert!(config.use_transpositions);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let bad = SearchConfig::default().with_exploration(-1.0);
        assert_eq!(bad.validate(), Err(ConfigError::Exploration(-1.0)));
        let bad = SearchConfig::default().with_rollout_noise(1.5);
        assert_eq!(bad.validate(), Err(ConfigError::RolloutNoise(1.5)));
        let bad = SearchConfig::default().with_iterations(0);
        assert_eq!(bad.validate(), Err(ConfigError::NoIterations));
    }
}
