//! Contract with the external passenger-flow simulator.
//!
//! The simulator is a black box: it receives the four control parameters and
//! answers with 14 named statistics (`{h_out, I, A, mu, Q, P, dwell} ×
//! {mean, std}`). Calls are synchronous and blocking; the next action depends
//! on the answer, so at most one call is ever outstanding.

pub mod error;
pub mod retry;

pub use error::SimulatorError;
pub use retry::{RetryPolicy, RetryingSimulator};

use crate::control::parameters::ControlParameters;
use crate::control::state::{NamedMetrics, State};

/// Request/response access to the simulator.
pub trait Simulator {
    /// Runs one simulation at `params` and returns the named statistics.
    fn run(&mut self, params: &ControlParameters) -> Result<NamedMetrics, SimulatorError>;
}

impl<S: Simulator + ?Sized> Simulator for &mut S {
    fn run(&mut self, params: &ControlParameters) -> Result<NamedMetrics, SimulatorError> {
        (**self).run(params)
    }
}

impl<S: Simulator + ?Sized> Simulator for Box<S> {
    fn run(&mut self, params: &ControlParameters) -> Result<NamedMetrics, SimulatorError> {
        (**self).run(params)
    }
}

/// Adapts a closure into a [`Simulator`].
pub struct FnSimulator<F> {
    f: F,
}

impl<F> FnSimulator<F>
where
    F: FnMut(&ControlParameters) -> Result<NamedMetrics, SimulatorError>,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> Simulator for FnSimulator<F>
where
    F: FnMut(&ControlParameters) -> Result<NamedMetrics, SimulatorError>,
{
    fn run(&mut self, params: &ControlParameters) -> Result<NamedMetrics, SimulatorError> {
        (self.f)(params)
    }
}

/// Answers every request with the same statistics.
///
/// Useful as a stub for tests and dry runs. Records how often it was called
/// and the last parameters it saw.
#[derive(Debug, Clone)]
pub struct ConstantSimulator {
    state: State,
    calls: usize,
    last_params: Option<ControlParameters>,
}

impl ConstantSimulator {
    pub fn new(state: State) -> Self {
        Self {
            state,
            calls: 0,
            last_params: None,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls
    }

    pub fn last_params(&self) -> Option<&ControlParameters> {
        self.last_params.as_ref()
    }
}

impl Simulator for ConstantSimulator {
    fn run(&mut self, params: &ControlParameters) -> Result<NamedMetrics, SimulatorError> {
        self.calls += 1;
        self.last_params = Some(*params);
        Ok(self.state.to_named())
    }
}
