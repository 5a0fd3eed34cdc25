//! Training and play driver.
//!
//! [`Trainer`] runs episodes of the control environment with a
//! [`DqnAgent`](crate::agent::DqnAgent), records an [`EpisodeTrace`] per
//! episode and persists the learned model. [`EvaluationMetrics`] scores any
//! [`Policy`](crate::agent::Policy) without learning.

pub mod error;
pub mod metrics;
pub mod trace;
pub mod trainer;

pub use error::TrainingError;
pub use metrics::EvaluationMetrics;
pub use trace::{EpisodeTrace, StepRecord};
pub use trainer::{random_parameters, Trainer, TrainingConfig};
