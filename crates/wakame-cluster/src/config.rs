//! Simulation configuration.
//!
//! Tunable parameters for cluster size, naming, reproducibility and the
//! waiter's poll cadence.

use std::time::Duration;
use thiserror::Error;

/// Configuration for a simulated cluster.
#[derive(Debug, Clone)]
pub struct SimClusterConfig {
    /// Number of nodes created up front by the test harness.
    /// Default: 3
    pub node_count: usize,

    /// Host part of generated node names.
    /// Default: "127.0.0.1"
    pub node_name_prefix: String,

    /// Port of the first generated node; subsequent nodes count up.
    /// Default: 10000
    pub base_port: u16,

    /// Seed for the election shuffle; replays with the same seed elect the
    /// same leaders.
    /// Default: 42
    pub seed: u64,

    /// Poll cadence of the predicate waiter, in simulated time.
    /// Default: 50ms
    pub poll_interval: Duration,
}

impl Default for SimClusterConfig {
    fn default() -> Self {
        Self {
            node_count: 3,
            node_name_prefix: "127.0.0.1".to_string(),
            base_port: 10000,
            seed: 42,
            poll_interval: Duration::from_millis(50),
        }
    }
}

impl SimClusterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_node_count(mut self, count: usize) -> Self {
        self.node_count = count;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval.is_zero() {
            return Err(ConfigError::InvalidValue(
                "poll_interval must be > 0".into(),
            ));
        }
        if self.node_name_prefix.is_empty() {
            return Err(ConfigError::InvalidValue(
                "node_name_prefix must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid config value: {0}")]
    InvalidValue(String),
}
