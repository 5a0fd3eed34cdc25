//! Shaped reward combining comfort, headway and platform waiting.

use std::f64::consts::PI;

use log::debug;
use serde::{Deserialize, Serialize};

use super::state::State;

/// Reward-shaping constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RewardConfig {
    /// Passengers a train carries at comfort density (174.5 m² × 4 pass/m²).
    pub train_capacity: f64,
    /// Passengers a platform holds at optimal density (270 m² × 4 pass/m²).
    pub platform_capacity: f64,
    /// Used-capacity offset of the comfort sine; the peak sits at `offset + 0.5`.
    pub comfort_peak_offset: f64,
    /// Headway (s) at which the headway term crosses zero.
    pub headway_reference: f64,
    /// Divisor turning a headway difference into a reward term.
    pub headway_scale: f64,
    /// Platform occupancy ratio at which the waiting term crosses zero.
    pub waiting_offset: f64,
    pub comfort_weight: f64,
    pub headway_weight: f64,
    pub waiting_weight: f64,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            train_capacity: 174.5 * 4.0,
            platform_capacity: 270.0 * 4.0,
            comfort_peak_offset: 0.2,
            headway_reference: 600.0,
            headway_scale: 1000.0,
            waiting_offset: 0.5,
            comfort_weight: 4.0,
            headway_weight: 10.0,
            waiting_weight: 0.25,
        }
    }
}

/// Individual reward terms before weighting, plus the weighted total.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RewardBreakdown {
    pub used_capacity: f64,
    pub comfort: f64,
    pub headway: f64,
    pub waiting: f64,
    pub total: f64,
}

/// Computes rewards for the control environment.
pub struct RewardComputer;

impl RewardComputer {
    /// Computes the reward for moving from `previous` to `next`.
    ///
    /// # Components
    ///
    /// 1. **Comfort**: `sin((P_mean / train_capacity - 0.2) * π) - 0.5`.
    ///    Negative for nearly empty trains, maximal around 70% load.
    /// 2. **Headway**: `(600 - h_out_mean) / 1000`, positive below ten minutes.
    /// 3. **Waiting**: `0.5 - Q_mean / platform_capacity`.
    ///
    /// Only `next` enters the formula today.
    pub fn compute(previous: &State, next: &State, config: &RewardConfig) -> f64 {
        Self::breakdown(previous, next, config).total
    }

    /// Same as [`RewardComputer::compute`] but keeps every term.
    pub fn breakdown(_previous: &State, next: &State, config: &RewardConfig) -> RewardBreakdown {
        let used_capacity = next.p.mean / config.train_capacity;
        let comfort = ((used_capacity - config.comfort_peak_offset) * PI).sin() - 0.5;
        let headway = (config.headway_reference - next.h_out.mean) / config.headway_scale;
        let waiting = config.waiting_offset - next.q.mean / config.platform_capacity;

        let total = config.comfort_weight * comfort
            + config.headway_weight * headway
            + config.waiting_weight * waiting;

        debug!(
            "reward: comfort={:.4} (used {:.3}) headway={:.4} (h_out {:.1}) waiting={:.4} total={:.4}",
            comfort, used_capacity, headway, next.h_out.mean, waiting, total
        );

        RewardBreakdown {
            used_capacity,
            comfort,
            headway,
            waiting,
            total,
        }
    }
}
