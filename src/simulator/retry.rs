//! Bounded retry with exponential backoff around a [`Simulator`].

use std::thread;
use std::time::Duration;

use log::warn;
use serde::{Deserialize, Serialize};

use super::{Simulator, SimulatorError};
use crate::control::parameters::ControlParameters;
use crate::control::state::NamedMetrics;

/// How often and how patiently an unavailable simulator is retried.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one. Zero behaves as one.
    pub max_attempts: u32,
    /// Sleep before the second attempt.
    pub initial_backoff: Duration,
    /// Growth factor applied to the backoff after every failed attempt.
    pub multiplier: f64,
    /// Upper bound for a single sleep.
    pub max_backoff: Duration,
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Sleep to apply after the failed attempt number `attempt` (1-based).
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1) as i32;
        let secs = self.initial_backoff.as_secs_f64() * self.multiplier.powi(exponent);
        if secs.is_nan() || secs <= 0.0 {
            Duration::ZERO
        } else if secs >= self.max_backoff.as_secs_f64() {
            self.max_backoff
        } else {
            Duration::from_secs_f64(secs)
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(500),
            multiplier: 2.0,
            max_backoff: Duration::from_secs(10),
        }
    }
}

/// Retries [`SimulatorError::Unavailable`] failures of the wrapped simulator.
///
/// Protocol errors are returned immediately: rerunning a simulator that
/// answered with a malformed result set is not expected to help.
#[derive(Debug)]
pub struct RetryingSimulator<S> {
    inner: S,
    policy: RetryPolicy,
}

impl<S: Simulator> RetryingSimulator<S> {
    pub fn new(inner: S, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: Simulator> Simulator for RetryingSimulator<S> {
    fn run(&mut self, params: &ControlParameters) -> Result<NamedMetrics, SimulatorError> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.inner.run(params) {
                Ok(named) => return Ok(named),
                Err(e) if e.is_retryable() && attempt < max_attempts => {
                    let backoff = self.policy.backoff_for(attempt);
                    warn!(
                        "simulator attempt {}/{} failed: {}; retrying in {:?}",
                        attempt, max_attempts, e, backoff
                    );
                    if !backoff.is_zero() {
                        thread::sleep(backoff);
                    }
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::state::State;
    use crate::simulator::FnSimulator;

    fn instant(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            initial_backoff: Duration::ZERO,
            multiplier: 2.0,
            max_backoff: Duration::ZERO,
        }
    }

    fn params() -> ControlParameters {
        ControlParameters::new(40, 12.0, 25.0, 3.0)
    }

    #[test]
    fn recovers_after_transient_failures() {
        let mut failures_left = 2;
        let flaky = FnSimulator::new(move |_: &ControlParameters| {
            if failures_left > 0 {
                failures_left -= 1;
                Err(SimulatorError::Unavailable("busy".into()))
            } else {
                Ok(State::default().to_named())
            }
        });
        let mut sim = RetryingSimulator::new(flaky, instant(3));
        assert!(sim.run(&params()).is_ok());
    }

    #[test]
    fn gives_up_after_max_attempts() {
        let mut calls = 0;
        {
            let down = FnSimulator::new(|_: &ControlParameters| {
                calls += 1;
                Err(SimulatorError::Unavailable("down".into()))
            });
            let mut sim = RetryingSimulator::new(down, instant(4));
            assert_eq!(
                sim.run(&params()),
                Err(SimulatorError::Unavailable("down".into()))
            );
        }
        assert_eq!(calls, 4);
    }

    #[test]
    fn protocol_errors_are_not_retried() {
        let mut calls = 0;
        {
            let broken = FnSimulator::new(|_: &ControlParameters| {
                calls += 1;
                Err(SimulatorError::MissingMetric("P_mean".into()))
            });
            let mut sim = RetryingSimulator::new(broken, instant(5));
            assert!(sim.run(&params()).is_err());
        }
        assert_eq!(calls, 1);
    }

    #[test]
    fn backoff_grows_and_is_capped() {
        let policy = RetryPolicy {
            max_attempts: 5,
            initial_backoff: Duration::from_millis(100),
            multiplier: 2.0,
            max_backoff: Duration::from_millis(300),
        };
        assert_eq!(policy.backoff_for(1), Duration::from_millis(100));
        assert_eq!(policy.backoff_for(2), Duration::from_millis(200));
        assert_eq!(policy.backoff_for(3), Duration::from_millis(300));
        assert_eq!(policy.backoff_for(10), Duration::from_millis(300));
    }

    #[test]
    fn none_policy_makes_a_single_attempt() {
        assert_eq!(RetryPolicy::none().max_attempts, 1);
    }
}
