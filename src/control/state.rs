//! Fixed-schema state record built from simulator output.
//!
//! The simulator reports 14 named scalars: a mean and a standard deviation
//! for each of seven flow metrics. [`State`] holds them as typed fields and
//! encodes them into a [`StateVector`] in a declared order:
//!
//! ```text
//! [h_out.mean, h_out.std, I.mean, I.std, A.mean, A.std, mu.mean, mu.std,
//!  Q.mean, Q.std, P.mean, P.std, dwell.mean, dwell.std]
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::simulator::SimulatorError;

/// Number of scalars in an encoded state.
pub const STATE_DIM: usize = MetricKind::COUNT * 2;

/// Numeric state consumed by the approximators.
pub type StateVector = [f64; STATE_DIM];

/// Raw simulator output keyed by `<metric>_mean` / `<metric>_std`.
pub type NamedMetrics = BTreeMap<String, f64>;

/// The seven flow metrics reported by the simulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetricKind {
    /// Headway between departures (s).
    HOut,
    /// Passengers in the station.
    I,
    /// Flow of passengers willing to enter.
    A,
    /// Flow of passengers boarding.
    Mu,
    /// Passengers waiting on the platform.
    Q,
    /// Passengers on board.
    P,
    /// Dwell time (s).
    Dwell,
}

impl MetricKind {
    pub const COUNT: usize = 7;

    /// All metrics in encoding order.
    pub const ALL: [MetricKind; MetricKind::COUNT] = [
        MetricKind::HOut,
        MetricKind::I,
        MetricKind::A,
        MetricKind::Mu,
        MetricKind::Q,
        MetricKind::P,
        MetricKind::Dwell,
    ];

    /// Key prefix used by the simulator.
    pub fn key(self) -> &'static str {
        match self {
            MetricKind::HOut => "h_out",
            MetricKind::I => "I",
            MetricKind::A => "A",
            MetricKind::Mu => "mu",
            MetricKind::Q => "Q",
            MetricKind::P => "P",
            MetricKind::Dwell => "dwell",
        }
    }

    pub fn mean_key(self) -> String {
        format!("{}_mean", self.key())
    }

    pub fn std_key(self) -> String {
        format!("{}_std", self.key())
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Mean and standard deviation of one metric over a simulation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricSummary {
    pub mean: f64,
    pub std: f64,
}

impl MetricSummary {
    pub const fn new(mean: f64, std: f64) -> Self {
        Self { mean, std }
    }
}

/// Simulator statistics for one operating point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct State {
    pub h_out: MetricSummary,
    pub i: MetricSummary,
    pub a: MetricSummary,
    pub mu: MetricSummary,
    pub q: MetricSummary,
    pub p: MetricSummary,
    pub dwell: MetricSummary,
}

impl State {
    pub fn metric(&self, kind: MetricKind) -> &MetricSummary {
        match kind {
            MetricKind::HOut => &self.h_out,
            MetricKind::I => &self.i,
            MetricKind::A => &self.a,
            MetricKind::Mu => &self.mu,
            MetricKind::Q => &self.q,
            MetricKind::P => &self.p,
            MetricKind::Dwell => &self.dwell,
        }
    }

    fn metric_mut(&mut self, kind: MetricKind) -> &mut MetricSummary {
        match kind {
            MetricKind::HOut => &mut self.h_out,
            MetricKind::I => &mut self.i,
            MetricKind::A => &mut self.a,
            MetricKind::Mu => &mut self.mu,
            MetricKind::Q => &mut self.q,
            MetricKind::P => &mut self.p,
            MetricKind::Dwell => &mut self.dwell,
        }
    }

    /// Returns a copy with `kind` replaced.
    pub fn with_metric(mut self, kind: MetricKind, summary: MetricSummary) -> Self {
        *self.metric_mut(kind) = summary;
        self
    }

    /// Parses the 14 named scalars produced by the simulator.
    ///
    /// Every `<metric>_mean` / `<metric>_std` key must be present and finite,
    /// and no other key is accepted.
    pub fn from_named(named: &NamedMetrics) -> Result<Self, SimulatorError> {
        let mut state = State::default();
        for kind in MetricKind::ALL {
            let mean = lookup(named, &kind.mean_key())?;
            let std = lookup(named, &kind.std_key())?;
            *state.metric_mut(kind) = MetricSummary::new(mean, std);
        }
        if named.len() != STATE_DIM {
            let unknown = named
                .keys()
                .find(|key| {
                    !MetricKind::ALL
                        .iter()
                        .any(|k| **key == k.mean_key() || **key == k.std_key())
                })
                .cloned()
                .unwrap_or_default();
            return Err(SimulatorError::UnknownMetric(unknown));
        }
        Ok(state)
    }

    /// Inverse of [`State::from_named`].
    pub fn to_named(&self) -> NamedMetrics {
        let mut named = NamedMetrics::new();
        for kind in MetricKind::ALL {
            let summary = self.metric(kind);
            named.insert(kind.mean_key(), summary.mean);
            named.insert(kind.std_key(), summary.std);
        }
        named
    }

    /// Encodes the state in the fixed order documented at module level.
    pub fn to_vector(&self) -> StateVector {
        let mut out = [0.0; STATE_DIM];
        for (i, kind) in MetricKind::ALL.iter().enumerate() {
            let summary = self.metric(*kind);
            out[2 * i] = summary.mean;
            out[2 * i + 1] = summary.std;
        }
        out
    }
}

fn lookup(named: &NamedMetrics, key: &str) -> Result<f64, SimulatorError> {
    let value = *named
        .get(key)
        .ok_or_else(|| SimulatorError::MissingMetric(key.to_string()))?;
    if !value.is_finite() {
        return Err(SimulatorError::NonFiniteMetric {
            key: key.to_string(),
            value,
        });
    }
    Ok(value)
}

/// Deterministic reordering of named simulator output into the encoded form.
pub fn encode_state(named: &NamedMetrics) -> Result<StateVector, SimulatorError> {
    State::from_named(named).map(|state| state.to_vector())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_state() -> State {
        let mut state = State::default();
        for (i, kind) in MetricKind::ALL.iter().enumerate() {
            state = state.with_metric(*kind, MetricSummary::new(i as f64 * 10.0, i as f64));
        }
        state
    }

    #[test]
    fn vector_follows_declared_order() {
        let v = sample_state().to_vector();
        assert_eq!(
            v,
            [0.0, 0.0, 10.0, 1.0, 20.0, 2.0, 30.0, 3.0, 40.0, 4.0, 50.0, 5.0, 60.0, 6.0]
        );
    }

    #[test]
    fn named_keys_match_simulator_contract() {
        let named = sample_state().to_named();
        let keys: Vec<&str> = named.keys().map(|k| k.as_str()).collect();
        for expected in [
            "h_out_mean", "h_out_std", "I_mean", "I_std", "A_mean", "A_std", "mu_mean",
            "mu_std", "Q_mean", "Q_std", "P_mean", "P_std", "dwell_mean", "dwell_std",
        ] {
            assert!(keys.contains(&expected), "missing {expected}");
        }
        assert_eq!(named.len(), STATE_DIM);
    }

    #[test]
    fn from_named_recovers_state() {
        let state = sample_state();
        assert_eq!(State::from_named(&state.to_named()).unwrap(), state);
        assert_eq!(encode_state(&state.to_named()).unwrap(), state.to_vector());
    }

    #[test]
    fn missing_key_is_a_protocol_error() {
        let mut named = sample_state().to_named();
        named.remove("Q_std");
        assert_eq!(
            State::from_named(&named),
            Err(SimulatorError::MissingMetric("Q_std".into()))
        );
    }

    #[test]
    fn non_finite_value_is_rejected() {
        let mut named = sample_state().to_named();
        named.insert("P_mean".into(), f64::NAN);
        assert!(matches!(
            State::from_named(&named),
            Err(SimulatorError::NonFiniteMetric { ref key, .. }) if key == "P_mean"
        ));
    }

    #[test]
    fn extra_key_is_rejected() {
        let mut named = sample_state().to_named();
        named.insert("speed_mean".into(), 1.0);
        assert_eq!(
            State::from_named(&named),
            Err(SimulatorError::UnknownMetric("speed_mean".into()))
        );
    }
}
