//! Per-episode record of parameters, states and rewards.

use crate::control::action::ActionId;
use crate::control::parameters::{ControlParameters, Parameter};
use crate::control::state::{MetricKind, State};

/// One executed step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepRecord {
    /// Zero-based step index within the episode.
    pub step: usize,
    pub action: ActionId,
    /// Parameters after the action was applied.
    pub params: ControlParameters,
    /// Statistics observed at `params`.
    pub state: State,
    pub reward: f64,
}

/// Everything observed during one episode.
///
/// Series accessors include the starting point, so they hold
/// `steps().len() + 1` entries.
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeTrace {
    initial_params: ControlParameters,
    initial_state: State,
    steps: Vec<StepRecord>,
}

impl EpisodeTrace {
    pub fn new(initial_params: ControlParameters, initial_state: State) -> Self {
        Self {
            initial_params,
            initial_state,
            steps: Vec::new(),
        }
    }

    pub fn push(&mut self, record: StepRecord) {
        self.steps.push(record);
    }

    pub fn initial_params(&self) -> &ControlParameters {
        &self.initial_params
    }

    pub fn initial_state(&self) -> &State {
        &self.initial_state
    }

    pub fn steps(&self) -> &[StepRecord] {
        &self.steps
    }

    /// Parameters in force at the end of the episode.
    pub fn final_params(&self) -> &ControlParameters {
        self.steps
            .last()
            .map_or(&self.initial_params, |r| &r.params)
    }

    pub fn rewards(&self) -> Vec<f64> {
        self.steps.iter().map(|r| r.reward).collect()
    }

    pub fn total_reward(&self) -> f64 {
        self.steps.iter().map(|r| r.reward).sum()
    }

    /// Values of `parameter`, starting point first.
    pub fn parameter_series(&self, parameter: Parameter) -> Vec<f64> {
        std::iter::once(&self.initial_params)
            .chain(self.steps.iter().map(|r| &r.params))
            .map(|p| p.get(parameter))
            .collect()
    }

    /// Mean of `kind` at every point, starting point first.
    pub fn metric_series(&self, kind: MetricKind) -> Vec<f64> {
        std::iter::once(&self.initial_state)
            .chain(self.steps.iter().map(|r| &r.state))
            .map(|s| s.metric(kind).mean)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::state::MetricSummary;

    fn trace() -> EpisodeTrace {
        let start = ControlParameters::new(40, 12.0, 25.0, 3.0);
        let mut trace = EpisodeTrace::new(start, State::default());
        for step in 0..3 {
            let params = start.with(Parameter::NbrTrains, 41.0 + step as f64);
            let state = State::default()
                .with_metric(MetricKind::HOut, MetricSummary::new(100.0 * step as f64, 1.0));
            trace.push(StepRecord {
                step,
                action: ActionId::default(),
                params,
                state,
                reward: step as f64 + 0.5,
            });
        }
        trace
    }

    #[test]
    fn rewards_and_total() {
        let t = trace();
        assert_eq!(t.rewards(), vec![0.5, 1.5, 2.5]);
        assert_eq!(t.total_reward(), 4.5);
    }

    #[test]
    fn series_include_the_starting_point() {
        let t = trace();
        assert_eq!(
            t.parameter_series(Parameter::NbrTrains),
            vec![40.0, 41.0, 42.0, 43.0]
        );
        assert_eq!(t.metric_series(MetricKind::HOut), vec![0.0, 0.0, 100.0, 200.0]);
        assert_eq!(t.final_params().nbr_trains, 43);
    }

    #[test]
    fn empty_trace_ends_where_it_started() {
        let start = ControlParameters::new(30, 10.0, 20.0, 2.5);
        let t = EpisodeTrace::new(start, State::default());
        assert_eq!(t.final_params(), &start);
        assert_eq!(t.total_reward(), 0.0);
    }
}
