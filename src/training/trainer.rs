//! Episode driver for training and greedy play.

use std::path::Path;

use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::error::TrainingError;
use super::trace::{EpisodeTrace, StepRecord};
use crate::agent::{DqnAgent, MlpApproximator, QApproximator, Transition};
use crate::control::config::EnvConfig;
use crate::control::environment::ControlEnvironment;
use crate::control::parameters::{ControlParameters, ParameterLimits};
use crate::simulator::Simulator;

/// Shape of a training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    pub episodes: usize,
    pub steps: usize,
    /// Seed for drawing initial parameters. `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl TrainingConfig {
    /// Episode shape taken from the environment defaults.
    pub fn from_env(config: &EnvConfig) -> Self {
        Self {
            episodes: config.max_episodes,
            steps: config.max_steps,
            seed: None,
        }
    }
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self::from_env(&EnvConfig::default())
    }
}

/// Draws a starting operating point uniformly within `limits`.
///
/// The train count is an integer; the other parameters are rounded to two
/// decimals.
pub fn random_parameters<R: Rng + ?Sized>(limits: &ParameterLimits, rng: &mut R) -> ControlParameters {
    let trains = &limits.nbr_trains;
    let nbr_trains = rng.gen_range(trains.min.ceil() as u32..=trains.max.floor() as u32);
    let mut draw = |min: f64, max: f64| round2(rng.gen_range(min..=max)).clamp(min, max);
    let v_max = draw(limits.v_max.min, limits.v_max.max);
    let max_dwell = draw(limits.max_dwell.min, limits.max_dwell.max);
    let density_max_opt = draw(limits.density_max_opt.min, limits.density_max_opt.max);
    ControlParameters::new(nbr_trains, v_max, max_dwell, density_max_opt)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Runs episodes of the control environment with a learning agent.
///
/// Every step follows the same sequence: select an action on the encoded
/// state, step the environment, remember the transition, replay, and
/// soft-update the target after a successful replay.
pub struct Trainer<S, A = MlpApproximator> {
    env: ControlEnvironment<S>,
    agent: DqnAgent<A>,
    config: TrainingConfig,
    rng: StdRng,
}

impl<S: Simulator, A: QApproximator> Trainer<S, A> {
    pub fn new(env: ControlEnvironment<S>, agent: DqnAgent<A>, config: TrainingConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            env,
            agent,
            config,
            rng,
        }
    }

    /// Trains for `config.episodes` episodes from random starting points.
    pub fn train(&mut self) -> Result<Vec<EpisodeTrace>, TrainingError> {
        let episodes = self.config.episodes;
        let mut traces = Vec::with_capacity(episodes);
        for episode in 0..episodes {
            let initial = random_parameters(&self.env.config.limits, &mut self.rng);
            info!("episode {}/{} starting at {}", episode + 1, episodes, initial);
            let trace = self.run_episode(initial, self.config.steps)?;
            info!(
                "episode {}/{} done: total reward {:.4}, epsilon {:.4}",
                episode + 1,
                episodes,
                trace.total_reward(),
                self.agent.epsilon()
            );
            traces.push(trace);
        }
        Ok(traces)
    }

    /// Runs one greedy episode from caller-supplied parameters.
    ///
    /// `initial` is bound-checked before the simulator is invoked. The agent
    /// keeps remembering and replaying while it plays.
    pub fn play(
        &mut self,
        initial: ControlParameters,
        steps: usize,
    ) -> Result<EpisodeTrace, TrainingError> {
        self.env.config.limits.validate(&initial)?;
        self.agent.set_exploration(0.0, 0.0);
        info!("playing {} steps from {}", steps, initial);
        let trace = self.run_episode(initial, steps)?;
        info!("play done: total reward {:.4}", trace.total_reward());
        Ok(trace)
    }

    /// Persists the agent's target approximator.
    pub fn save_model(&self, path: &Path) -> Result<(), TrainingError> {
        self.agent.save(path)?;
        Ok(())
    }

    fn run_episode(
        &mut self,
        initial: ControlParameters,
        steps: usize,
    ) -> Result<EpisodeTrace, TrainingError> {
        let mut state = self.env.reset(&initial)?;
        let mut params = initial;
        let mut trace = EpisodeTrace::new(initial, state);

        for step in 0..steps {
            let encoded = state.to_vector();
            let action = self.agent.select_action(&encoded);
            let result = self.env.step(&state, &params, action)?;

            self.agent.remember(Transition {
                state: encoded,
                action,
                reward: result.reward,
                next_state: result.state.to_vector(),
                terminal: result.terminal,
            });
            if self.agent.replay() {
                self.agent.sync_target();
            }

            debug!("step {}: {} reward {:.4}", step, result.params, result.reward);
            trace.push(StepRecord {
                step,
                action,
                params: result.params,
                state: result.state,
                reward: result.reward,
            });
            state = result.state;
            params = result.params;
            if result.terminal {
                break;
            }
        }
        Ok(trace)
    }

    pub fn agent(&self) -> &DqnAgent<A> {
        &self.agent
    }

    pub fn agent_mut(&mut self) -> &mut DqnAgent<A> {
        &mut self.agent
    }

    pub fn env(&self) -> &ControlEnvironment<S> {
        &self.env
    }

    pub fn into_parts(self) -> (ControlEnvironment<S>, DqnAgent<A>) {
        (self.env, self.agent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentConfig;
    use crate::control::parameters::Parameter;
    use crate::control::state::State;
    use crate::control::EnvironmentError;
    use crate::simulator::ConstantSimulator;

    fn small_agent(seed: u64) -> DqnAgent {
        DqnAgent::with_mlp(AgentConfig {
            hidden_layers: vec![8],
            seed: Some(seed),
            ..AgentConfig::default()
        })
    }

    fn trainer(seed: u64) -> Trainer<ConstantSimulator> {
        let env = ControlEnvironment::new(EnvConfig::default(), ConstantSimulator::new(State::default()));
        Trainer::new(
            env,
            small_agent(seed),
            TrainingConfig {
                episodes: 2,
                steps: 5,
                seed: Some(seed),
            },
        )
    }

    #[test]
    fn random_parameters_respect_limits() {
        let limits = ParameterLimits::default();
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..200 {
            let p = random_parameters(&limits, &mut rng);
            assert!(limits.validate(&p).is_ok(), "{}", p);
            assert_eq!(round2(p.v_max), p.v_max);
        }
    }

    #[test]
    fn train_produces_one_trace_per_episode() {
        let mut t = trainer(3);
        let traces = t.train().unwrap();
        assert_eq!(traces.len(), 2);
        for trace in &traces {
            assert_eq!(trace.steps().len(), 5);
            assert_eq!(trace.parameter_series(Parameter::VMax).len(), 6);
        }
        // One reset plus one simulation per step.
        assert_eq!(t.env().simulator().calls(), 2 * 6);
    }

    #[test]
    fn play_rejects_out_of_bounds_start_before_simulating() {
        let mut t = trainer(4);
        let err = t
            .play(ControlParameters::new(10, 12.0, 25.0, 3.0), 3)
            .unwrap_err();
        assert!(matches!(
            err,
            TrainingError::Environment(EnvironmentError::InvalidParameter {
                parameter: Parameter::NbrTrains,
                ..
            })
        ));
        assert_eq!(t.env().simulator().calls(), 0);
    }

    #[test]
    fn play_is_greedy() {
        let mut t = trainer(5);
        let trace = t.play(ControlParameters::new(40, 12.0, 25.0, 3.0), 4).unwrap();
        assert_eq!(trace.steps().len(), 4);
        assert_eq!(t.agent().epsilon(), 0.0);
    }
}
