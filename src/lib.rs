//! railtune - reinforcement-learning control of a simulated rail transit line
//!
//! An agent tunes four operating parameters of a line (train count, maximum
//! speed, maximum dwell time, target platform density) against an external
//! simulator, maximising a shaped reward of passenger comfort, headway
//! regularity and platform waiting.
//!
//! - [`control`]: action codec, clamped parameter updates, state encoding,
//!   reward shaping and the [`ControlEnvironment`].
//! - [`simulator`]: the [`Simulator`] contract and bounded retry.
//! - [`agent`]: epsilon-greedy [`DqnAgent`] with replay memory and a
//!   soft-updated target approximator.
//! - [`training`]: episode driver, traces and evaluation.

pub mod agent;
pub mod control;
pub mod simulator;
pub mod training;

pub use agent::{AgentConfig, DqnAgent, Policy, QApproximator};
pub use control::{ActionCodec, ActionId, ControlEnvironment, ControlParameters, EnvConfig, State};
pub use simulator::{RetryPolicy, RetryingSimulator, Simulator, SimulatorError};
pub use training::{Trainer, TrainingConfig, TrainingError};
