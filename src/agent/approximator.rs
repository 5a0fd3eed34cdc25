//! Capability interface for Q-value function approximators.

use std::path::Path;

use thiserror::Error;

/// Errors raised while persisting or restoring approximator weights.
#[derive(Debug, Error)]
pub enum ApproximatorError {
    #[error("artifact I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("artifact is not valid: {0}")]
    Format(#[from] serde_json::Error),

    #[error("weight shape mismatch: expected {expected}, found {found}")]
    ShapeMismatch { expected: String, found: String },

    #[cfg(feature = "rl-nn")]
    #[error("torch backend error: {0}")]
    Torch(#[from] tch::TchError),
}

/// Maps an encoded state to one Q-value estimate per action.
///
/// Any implementation satisfying this contract can back the policy and
/// target roles of [`DqnAgent`](super::dqn::DqnAgent).
pub trait QApproximator {
    /// Q-value estimates for `state`, one per action.
    fn predict(&self, state: &[f64]) -> Vec<f64>;

    /// One supervised pass towards `target` for `state`. Returns the loss
    /// measured before the update.
    fn fit(&mut self, state: &[f64], target: &[f64]) -> f64;

    /// Polyak smoothing: `self = tau * source + (1 - tau) * self`, per weight.
    fn soft_update_from(&mut self, source: &Self, tau: f64)
    where
        Self: Sized;

    /// Flattened snapshot of every weight, in a stable order.
    fn parameters(&self) -> Vec<f64>;

    /// Writes the weights to `path` as an opaque artifact.
    fn save(&self, path: &Path) -> Result<(), ApproximatorError>;

    /// Replaces the weights with the artifact at `path`.
    fn load(&mut self, path: &Path) -> Result<(), ApproximatorError>;
}

/// Index of the first maximum; `0` for an empty slice.
pub fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, v) in values.iter().enumerate() {
        if *v > values[best] {
            best = i;
        }
    }
    best
}

/// Largest value, ignoring NaN; negative infinity for an empty slice.
pub fn max_value(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}
