//! Learning agent: epsilon-greedy Q-learning over the discrete action space.
//!
//! [`DqnAgent`] is generic over its [`QApproximator`]. The default
//! [`MlpApproximator`] is a dependency-free dense network; a tch-rs backed
//! [`TchQNetwork`] is available with the `rl-nn` feature.

pub mod approximator;
pub mod config;
pub mod dqn;
pub mod memory;
pub mod mlp;
pub mod policy;

#[cfg(feature = "rl-nn")]
pub mod network;

pub use approximator::{ApproximatorError, QApproximator};
pub use config::AgentConfig;
pub use dqn::DqnAgent;
pub use memory::{ReplayMemory, Transition};
pub use mlp::MlpApproximator;
pub use policy::{FixedPolicy, Policy, RandomPolicy};

#[cfg(feature = "rl-nn")]
pub use network::TchQNetwork;
