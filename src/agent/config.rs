//! Hyper-parameters of the learning agent.

use serde::{Deserialize, Serialize};

use crate::control::action::ACTION_COUNT;
use crate::control::state::STATE_DIM;

/// Configuration for [`DqnAgent`](super::dqn::DqnAgent).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Discount factor.
    pub gamma: f64,
    /// Initial exploration rate.
    pub epsilon: f64,
    /// Floor for the exploration rate.
    pub epsilon_min: f64,
    /// Multiplicative decay applied before every action choice.
    pub epsilon_decay: f64,
    /// Target-smoothing factor for the soft update.
    pub tau: f64,
    /// Transitions consumed by one learning update.
    pub batch_size: usize,
    /// Replay memory capacity. Equal to `batch_size` reproduces single-pass
    /// learning: every transition is used exactly once and then dropped.
    pub memory_capacity: usize,
    /// Adam step size of the policy approximator.
    pub learning_rate: f64,
    /// Hidden layer widths between the state input and the action output.
    pub hidden_layers: Vec<usize>,
    /// Seed for exploration, replay sampling and weight initialisation.
    /// `None` seeds from the operating system.
    pub seed: Option<u64>,
}

impl AgentConfig {
    /// Switches off exploration entirely, as used when replaying a trained model.
    pub fn greedy(mut self) -> Self {
        self.epsilon = 0.0;
        self.epsilon_min = 0.0;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// `[STATE_DIM, hidden…, ACTION_COUNT]`.
    pub fn layer_sizes(&self) -> Vec<usize> {
        let mut sizes = Vec::with_capacity(self.hidden_layers.len() + 2);
        sizes.push(STATE_DIM);
        sizes.extend(&self.hidden_layers);
        sizes.push(ACTION_COUNT);
        sizes
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            gamma: 0.85,
            epsilon: 1.0,
            epsilon_min: 0.01,
            epsilon_decay: 0.998,
            tau: 0.125,
            batch_size: 8,
            memory_capacity: 8,
            learning_rate: 0.01,
            hidden_layers: vec![14, 192, 224, 400, 224],
            seed: None,
        }
    }
}
