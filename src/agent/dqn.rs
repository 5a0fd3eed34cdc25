//! Deep Q-learning agent with a Policy and a Target approximator.

use std::path::Path;

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::approximator::{argmax, max_value, ApproximatorError, QApproximator};
use super::config::AgentConfig;
use super::memory::{ReplayMemory, Transition};
use super::mlp::MlpApproximator;
use super::policy::Policy;
use crate::control::action::ActionId;
use crate::control::state::StateVector;

/// Epsilon-greedy Q-learning agent.
///
/// The Policy approximator is trained on replayed transitions; the Target
/// approximator chooses exploiting actions, provides the bootstrap estimate
/// and follows the Policy through Polyak smoothing.
pub struct DqnAgent<A = MlpApproximator> {
    config: AgentConfig,
    policy: A,
    target: A,
    memory: ReplayMemory,
    epsilon: f64,
    last_loss: Option<f64>,
    rng: StdRng,
}

impl DqnAgent<MlpApproximator> {
    /// Builds an agent whose two approximators are independently initialised
    /// MLPs of shape `config.layer_sizes()`.
    pub fn with_mlp(config: AgentConfig) -> Self {
        let mut rng = agent_rng(config.seed);
        let sizes = config.layer_sizes();
        let policy = MlpApproximator::new(&sizes, config.learning_rate, &mut rng);
        let target = MlpApproximator::new(&sizes, config.learning_rate, &mut rng);
        Self::from_parts(config, policy, target, rng)
    }
}

impl<A: QApproximator> DqnAgent<A> {
    /// Builds an agent around caller-provided approximators.
    pub fn new(config: AgentConfig, policy: A, target: A) -> Self {
        let rng = agent_rng(config.seed);
        Self::from_parts(config, policy, target, rng)
    }

    fn from_parts(mut config: AgentConfig, policy: A, target: A, rng: StdRng) -> Self {
        config.batch_size = config.batch_size.max(1);
        if config.memory_capacity < config.batch_size {
            warn!(
                "memory capacity {} is below batch size {}; raising it to the batch size",
                config.memory_capacity, config.batch_size
            );
            config.memory_capacity = config.batch_size;
        }
        Self {
            memory: ReplayMemory::new(config.memory_capacity),
            epsilon: config.epsilon,
            last_loss: None,
            config,
            policy,
            target,
            rng,
        }
    }

    /// Decays epsilon, then explores with probability epsilon or exploits
    /// the Target approximator's estimates.
    pub fn select_action(&mut self, state: &StateVector) -> ActionId {
        self.epsilon = (self.epsilon * self.config.epsilon_decay).max(self.config.epsilon_min);
        if self.rng.gen::<f64>() < self.epsilon {
            let action = ActionId::random(&mut self.rng);
            debug!("random action {} (epsilon {:.4})", action, self.epsilon);
            action
        } else {
            let q = self.target.predict(state);
            let action = ActionId::new(argmax(&q)).unwrap_or_default();
            debug!("predicted action {} (epsilon {:.4})", action, self.epsilon);
            action
        }
    }

    pub fn remember(&mut self, transition: Transition) {
        self.memory.push(transition);
    }

    /// Trains the Policy approximator on a sampled batch.
    ///
    /// Returns `false` without doing anything while fewer than `batch_size`
    /// transitions are stored. Otherwise fits every sampled transition and
    /// returns `true`.
    ///
    /// With `memory_capacity == batch_size` the memory is emptied after the
    /// update, so every transition is learned from exactly once. A larger
    /// capacity keeps a FIFO pool that later batches sample from again.
    pub fn replay(&mut self) -> bool {
        let batch_size = self.config.batch_size;
        if self.memory.len() < batch_size {
            return false;
        }

        let batch = self.memory.sample(&mut self.rng, batch_size);
        let mut total_loss = 0.0;
        for t in &batch {
            let mut q = self.policy.predict(&t.state);
            q[t.action.index()] = if t.terminal {
                t.reward
            } else {
                t.reward + self.config.gamma * max_value(&self.target.predict(&t.next_state))
            };
            total_loss += self.policy.fit(&t.state, &q);
        }
        if self.memory.capacity() == batch_size {
            self.memory.clear();
        }

        let loss = total_loss / batch.len() as f64;
        debug!("replayed {} transitions, mean loss {:.6}", batch.len(), loss);
        self.last_loss = Some(loss);
        true
    }

    /// `target = tau * policy + (1 - tau) * target`.
    pub fn sync_target(&mut self) {
        self.target.soft_update_from(&self.policy, self.config.tau);
    }

    /// Persists the Target approximator.
    pub fn save(&self, path: &Path) -> Result<(), ApproximatorError> {
        self.target.save(path)?;
        info!("saved target model to {}", path.display());
        Ok(())
    }

    /// Restores the Target approximator.
    pub fn load(&mut self, path: &Path) -> Result<(), ApproximatorError> {
        self.target.load(path)?;
        info!("loaded target model from {}", path.display());
        Ok(())
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Overrides the current exploration rate and its floor.
    pub fn set_exploration(&mut self, epsilon: f64, epsilon_min: f64) {
        self.epsilon = epsilon;
        self.config.epsilon_min = epsilon_min;
    }

    /// Mean loss of the most recent learning update.
    pub fn last_loss(&self) -> Option<f64> {
        self.last_loss
    }

    pub fn memory_len(&self) -> usize {
        self.memory.len()
    }

    pub fn memory(&self) -> &ReplayMemory {
        &self.memory
    }

    pub fn policy(&self) -> &A {
        &self.policy
    }

    pub fn target(&self) -> &A {
        &self.target
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }
}

impl<A: QApproximator> Policy for DqnAgent<A> {
    fn select_action(&mut self, state: &StateVector) -> ActionId {
        Self::select_action(self, state)
    }

    fn name(&self) -> &str {
        "dqn"
    }
}

fn agent_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}
