//! Control environment for the rail line.
//!
//! An agent tunes four operating parameters. Each step decodes a flat action
//! into per-parameter directives, applies them within bounds, runs the
//! simulator at the new operating point and scores the outcome.

pub mod action;
pub mod config;
pub mod environment;
pub mod error;
pub mod parameters;
pub mod reward;
pub mod state;

pub use action::{ActionCodec, ActionDirective, ActionId, ActionVector, ACTION_COUNT};
pub use config::EnvConfig;
pub use environment::{ControlEnvironment, StepResult};
pub use error::EnvironmentError;
pub use parameters::{ControlParameters, Parameter, ParameterBounds, ParameterLimits};
pub use reward::{RewardBreakdown, RewardComputer, RewardConfig};
pub use state::{encode_state, MetricKind, MetricSummary, NamedMetrics, State, StateVector, STATE_DIM};
