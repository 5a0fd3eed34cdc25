//! Control environment wrapping the external simulator.
//!
//! One step is: decode action → clamp parameter updates → run simulator →
//! parse metrics → compute reward.

use log::debug;

use super::action::{ActionCodec, ActionId};
use super::config::EnvConfig;
use super::error::EnvironmentError;
use super::parameters::ControlParameters;
use super::reward::RewardComputer;
use super::state::State;
use crate::simulator::Simulator;

/// Result of a single environment step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    /// Simulator statistics at the new operating point.
    pub state: State,
    /// Parameters after applying the action.
    pub params: ControlParameters,
    /// Shaped reward for the transition.
    pub reward: f64,
    /// Always `false`: episodes run for a fixed number of steps.
    pub terminal: bool,
    /// Why the episode ended, when it did. Always `None` today.
    pub reason: Option<String>,
}

/// Environment driving the simulator with discrete parameter adjustments.
///
/// # Lifecycle
///
/// 1. Call [`ControlEnvironment::new`] with configuration and a simulator.
/// 2. Call [`ControlEnvironment::reset`] with the starting parameters; they
///    are bound-checked before the simulator is touched.
/// 3. Repeatedly call [`ControlEnvironment::step`] with the latest state,
///    parameters and an action id.
#[derive(Debug)]
pub struct ControlEnvironment<S> {
    /// Environment configuration.
    pub config: EnvConfig,
    simulator: S,
}

impl<S: Simulator> ControlEnvironment<S> {
    pub fn new(config: EnvConfig, simulator: S) -> Self {
        Self { config, simulator }
    }

    /// Validates externally supplied parameters and runs the first simulation.
    pub fn reset(&mut self, params: &ControlParameters) -> Result<State, EnvironmentError> {
        self.config.limits.validate(params)?;
        self.simulate(params)
    }

    /// Runs the simulator once and parses its output.
    pub fn simulate(&mut self, params: &ControlParameters) -> Result<State, EnvironmentError> {
        let named = self.simulator.run(params)?;
        Ok(State::from_named(&named)?)
    }

    /// Executes one environment step.
    ///
    /// # Arguments
    ///
    /// * `state` - Statistics observed at `params`
    /// * `params` - Current operating point
    /// * `action` - Flat action id to decode and apply
    pub fn step(
        &mut self,
        state: &State,
        params: &ControlParameters,
        action: ActionId,
    ) -> Result<StepResult, EnvironmentError> {
        let directives = ActionCodec::decode(action);
        let next_params = self.config.limits.apply(&directives, params);
        debug!("action {} {} -> {}", action, directives, next_params);

        let next_state = self.simulate(&next_params)?;
        let reward = RewardComputer::compute(state, &next_state, &self.config.reward);

        Ok(StepResult {
            state: next_state,
            params: next_params,
            reward,
            terminal: false,
            reason: None,
        })
    }

    pub fn simulator(&self) -> &S {
        &self.simulator
    }

    pub fn simulator_mut(&mut self) -> &mut S {
        &mut self.simulator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::parameters::Parameter;
    use crate::control::state::{MetricKind, MetricSummary, NamedMetrics};
    use crate::simulator::{ConstantSimulator, FnSimulator, SimulatorError};

    fn reference_state() -> State {
        State::default()
            .with_metric(MetricKind::P, MetricSummary::new(488.6, 12.0))
            .with_metric(MetricKind::HOut, MetricSummary::new(600.0, 30.0))
            .with_metric(MetricKind::Q, MetricSummary::new(540.0, 40.0))
    }

    fn make_env() -> ControlEnvironment<ConstantSimulator> {
        ControlEnvironment::new(EnvConfig::default(), ConstantSimulator::new(reference_state()))
    }

    fn start() -> ControlParameters {
        ControlParameters::new(60, 21.9, 30.0, 3.0)
    }

    #[test]
    fn step_returns_reward_and_never_terminates() {
        let mut env = make_env();
        let state = env.reset(&start()).unwrap();
        let result = env.step(&state, &start(), ActionId::new(40).unwrap()).unwrap();
        assert_eq!(result.params, start());
        assert_eq!(result.state, reference_state());
        assert!((result.reward - 2.0).abs() < 1e-9);
        assert!(!result.terminal);
        assert!(result.reason.is_none());
    }

    #[test]
    fn step_clamps_at_bounds() {
        let mut env = make_env();
        let state = env.reset(&start()).unwrap();
        // all increase
        let result = env.step(&state, &start(), ActionId::new(80).unwrap()).unwrap();
        assert_eq!(result.params.nbr_trains, 61);
        assert_eq!(result.params.v_max, 21.9);
        assert!((result.params.max_dwell - 30.2).abs() < 1e-12);
        assert!((result.params.density_max_opt - 3.02).abs() < 1e-12);
    }

    #[test]
    fn simulator_receives_updated_parameters() {
        let sim = FnSimulator::new(|params: &ControlParameters| {
            let state = State::default().with_metric(
                MetricKind::HOut,
                MetricSummary::new(params.get(Parameter::NbrTrains) * 10.0, 0.0),
            );
            Ok(state.to_named())
        });
        let mut env = ControlEnvironment::new(EnvConfig::default(), sim);
        let state = env.reset(&start()).unwrap();
        assert_eq!(state.h_out.mean, 600.0);
        // trains decrease, everything else stays
        let result = env.step(&state, &start(), ActionId::new(13).unwrap()).unwrap();
        assert_eq!(result.params.nbr_trains, 59);
        assert_eq!(result.state.h_out.mean, 590.0);
    }

    #[test]
    fn reset_rejects_invalid_parameters_before_simulating() {
        let sim = FnSimulator::new(|_: &ControlParameters| -> Result<NamedMetrics, SimulatorError> {
            panic!("simulator must not run for invalid input")
        });
        let mut env = ControlEnvironment::new(EnvConfig::default(), sim);
        let err = env
            .reset(&ControlParameters::new(200, 10.0, 20.0, 3.0))
            .unwrap_err();
        assert!(matches!(
            err,
            EnvironmentError::InvalidParameter {
                parameter: Parameter::NbrTrains,
                ..
            }
        ));
    }

    #[test]
    fn malformed_simulator_output_surfaces_as_protocol_error() {
        let sim = FnSimulator::new(|_: &ControlParameters| {
            let mut named = State::default().to_named();
            named.remove("dwell_mean");
            Ok(named)
        });
        let mut env = ControlEnvironment::new(EnvConfig::default(), sim);
        match env.reset(&start()) {
            Err(EnvironmentError::Simulator(e)) => assert!(e.is_protocol()),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
