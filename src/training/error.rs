use thiserror::Error;

use crate::agent::ApproximatorError;
use crate::control::EnvironmentError;

/// Errors that abort a training or play run.
#[derive(Debug, Error)]
pub enum TrainingError {
    #[error("environment error: {0}")]
    Environment(#[from] EnvironmentError),

    #[error("model error: {0}")]
    Approximator(#[from] ApproximatorError),
}
