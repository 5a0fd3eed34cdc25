//! Configuration for the control environment.

use serde::{Deserialize, Serialize};

use super::action::ACTION_COUNT;
use super::parameters::ParameterLimits;
use super::reward::RewardConfig;
use super::state::STATE_DIM;

/// Configuration for the control environment.
///
/// Holds parameter bounds and step factors, reward shaping constants, and
/// the default episode shape used by the training driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvConfig {
    /// Bounds and step factor per control parameter.
    pub limits: ParameterLimits,
    /// Reward shaping constants.
    pub reward: RewardConfig,
    /// Default number of training episodes.
    pub max_episodes: usize,
    /// Default number of steps per episode.
    pub max_steps: usize,
}

impl EnvConfig {
    /// Size of the encoded state.
    pub fn observation_dim(&self) -> usize {
        STATE_DIM
    }

    /// Number of discrete actions.
    pub fn action_dim(&self) -> usize {
        ACTION_COUNT
    }
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            limits: ParameterLimits::default(),
            reward: RewardConfig::default(),
            max_episodes: 50,
            max_steps: 50,
        }
    }
}
