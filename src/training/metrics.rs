//! Evaluation metrics for a fixed policy.
//!
//! Runs episodes without learning and aggregates reward and the operating
//! point each episode settles on.

use std::fmt;

use crate::agent::Policy;
use crate::control::environment::ControlEnvironment;
use crate::control::error::EnvironmentError;
use crate::control::parameters::{ControlParameters, Parameter};
use crate::simulator::Simulator;

/// Aggregated evaluation metrics over multiple episodes.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationMetrics {
    /// Mean total reward per episode.
    pub mean_total_reward: f64,
    /// Mean per-step reward over all steps.
    pub mean_step_reward: f64,
    /// Best and worst episode totals.
    pub best_total_reward: f64,
    pub worst_total_reward: f64,
    /// Mean of each parameter at the end of an episode, in [`Parameter::ALL`] order.
    pub mean_final_params: [f64; Parameter::COUNT],
    /// Number of episodes evaluated.
    pub n_episodes: usize,
    pub steps_per_episode: usize,
}

impl EvaluationMetrics {
    /// Evaluates a policy over multiple episodes and returns aggregated metrics.
    ///
    /// # Arguments
    ///
    /// * `env` - The environment to evaluate in
    /// * `policy` - The policy to evaluate; it only selects actions
    /// * `initial` - Starting point of every episode, bound-checked first
    /// * `n_episodes` - Number of episodes to run
    /// * `steps` - Steps per episode
    pub fn evaluate<S: Simulator>(
        env: &mut ControlEnvironment<S>,
        policy: &mut dyn Policy,
        initial: &ControlParameters,
        n_episodes: usize,
        steps: usize,
    ) -> Result<Self, EnvironmentError> {
        let mut totals = Vec::with_capacity(n_episodes);
        let mut finals = Vec::with_capacity(n_episodes);

        for _ in 0..n_episodes {
            let mut state = env.reset(initial)?;
            let mut params = *initial;
            let mut total = 0.0;

            for _ in 0..steps {
                let action = policy.select_action(&state.to_vector());
                let result = env.step(&state, &params, action)?;
                total += result.reward;
                state = result.state;
                params = result.params;
                if result.terminal {
                    break;
                }
            }

            totals.push(total);
            finals.push(params);
        }

        let n = n_episodes.max(1) as f64;
        let mean_total_reward = totals.iter().sum::<f64>() / n;
        let mean_step_reward = if steps > 0 {
            mean_total_reward / steps as f64
        } else {
            0.0
        };
        // Both extremes are zero when no episode ran.
        let best_total_reward = totals.iter().copied().reduce(f64::max).unwrap_or(0.0);
        let worst_total_reward = totals.iter().copied().reduce(f64::min).unwrap_or(0.0);

        let mut mean_final_params = [0.0; Parameter::COUNT];
        for (slot, parameter) in mean_final_params.iter_mut().zip(Parameter::ALL) {
            *slot = finals.iter().map(|p| p.get(parameter)).sum::<f64>() / n;
        }

        Ok(Self {
            mean_total_reward,
            mean_step_reward,
            best_total_reward,
            worst_total_reward,
            mean_final_params,
            n_episodes,
            steps_per_episode: steps,
        })
    }
}

impl fmt::Display for EvaluationMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "=== Evaluation Metrics ({} episodes x {} steps) ===",
            self.n_episodes, self.steps_per_episode
        )?;
        writeln!(f, "  Mean total reward:   {:.3}", self.mean_total_reward)?;
        writeln!(f, "  Mean step reward:    {:.3}", self.mean_step_reward)?;
        writeln!(
            f,
            "  Best / worst total:  {:.3} / {:.3}",
            self.best_total_reward, self.worst_total_reward
        )?;
        for (parameter, value) in Parameter::ALL.iter().zip(&self.mean_final_params) {
            writeln!(f, "  Final {:<24} {:.2}", format!("{}:", parameter), value)?;
        }
        Ok(())
    }
}
