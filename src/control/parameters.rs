//! Control parameters, their bounds, and the clamped update rule.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::action::{ActionDirective, ActionVector};
use super::error::EnvironmentError;

/// The four tunable operating parameters of the line.
///
/// Declaration order is the action-vector order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Parameter {
    NbrTrains,
    DensityMaxOpt,
    VMax,
    MaxDwell,
}

impl Parameter {
    pub const COUNT: usize = 4;

    /// All parameters in action-vector order.
    pub const ALL: [Parameter; Parameter::COUNT] = [
        Parameter::NbrTrains,
        Parameter::DensityMaxOpt,
        Parameter::VMax,
        Parameter::MaxDwell,
    ];

    /// Position of this parameter inside an [`ActionVector`].
    pub fn index(self) -> usize {
        match self {
            Parameter::NbrTrains => 0,
            Parameter::DensityMaxOpt => 1,
            Parameter::VMax => 2,
            Parameter::MaxDwell => 3,
        }
    }

    /// Wire name used by the simulator contract.
    pub fn key(self) -> &'static str {
        match self {
            Parameter::NbrTrains => "nbr_trains",
            Parameter::DensityMaxOpt => "density_max_opt",
            Parameter::VMax => "v_max",
            Parameter::MaxDwell => "max_dwell",
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Parameter::NbrTrains => write!(f, "number of trains"),
            Parameter::DensityMaxOpt => write!(f, "maximum optimal density"),
            Parameter::VMax => write!(f, "maximum speed"),
            Parameter::MaxDwell => write!(f, "maximum dwell time"),
        }
    }
}

/// Operating point handed to the simulator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlParameters {
    /// Number of trains in service.
    pub nbr_trains: u32,
    /// Maximum train speed (m/s).
    pub v_max: f64,
    /// Maximum dwell time at a platform (s).
    pub max_dwell: f64,
    /// Target platform density (passengers/m²).
    pub density_max_opt: f64,
}

impl ControlParameters {
    pub fn new(nbr_trains: u32, v_max: f64, max_dwell: f64, density_max_opt: f64) -> Self {
        Self {
            nbr_trains,
            v_max,
            max_dwell,
            density_max_opt,
        }
    }

    /// Reads a parameter as a float.
    pub fn get(&self, parameter: Parameter) -> f64 {
        match parameter {
            Parameter::NbrTrains => self.nbr_trains as f64,
            Parameter::DensityMaxOpt => self.density_max_opt,
            Parameter::VMax => self.v_max,
            Parameter::MaxDwell => self.max_dwell,
        }
    }

    /// Returns a copy with `parameter` set to `value`.
    ///
    /// The train count is rounded to the nearest integer.
    pub fn with(mut self, parameter: Parameter, value: f64) -> Self {
        match parameter {
            Parameter::NbrTrains => self.nbr_trains = value.round().max(0.0) as u32,
            Parameter::DensityMaxOpt => self.density_max_opt = value,
            Parameter::VMax => self.v_max = value,
            Parameter::MaxDwell => self.max_dwell = value,
        }
        self
    }
}

impl fmt::Display for ControlParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "nbr_trains={} v_max={:.2} max_dwell={:.2} density_max_opt={:.2}",
            self.nbr_trains, self.v_max, self.max_dwell, self.density_max_opt
        )
    }
}

/// Closed interval `[min, max]` plus the step applied by one directive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterBounds {
    pub min: f64,
    pub max: f64,
    pub factor: f64,
}

impl ParameterBounds {
    pub const fn new(min: f64, max: f64, factor: f64) -> Self {
        Self { min, max, factor }
    }

    /// True when `value` lies in `[min, max]`. NaN is never contained.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Applies one directive to `value`.
    ///
    /// A move that would leave `[min, max]` is a no-op: values are never
    /// wrapped or partially moved.
    pub fn apply(&self, directive: ActionDirective, value: f64) -> f64 {
        match directive {
            ActionDirective::Decrease if value - self.factor >= self.min => value - self.factor,
            ActionDirective::Increase if value + self.factor <= self.max => value + self.factor,
            _ => value,
        }
    }
}

/// Bounds for every control parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterLimits {
    pub nbr_trains: ParameterBounds,
    pub density_max_opt: ParameterBounds,
    pub v_max: ParameterBounds,
    pub max_dwell: ParameterBounds,
}

impl ParameterLimits {
    pub fn bounds(&self, parameter: Parameter) -> &ParameterBounds {
        match parameter {
            Parameter::NbrTrains => &self.nbr_trains,
            Parameter::DensityMaxOpt => &self.density_max_opt,
            Parameter::VMax => &self.v_max,
            Parameter::MaxDwell => &self.max_dwell,
        }
    }

    /// Bound-check contract for externally supplied parameters.
    ///
    /// Values outside their interval are rejected, never clamped. Callers
    /// must run this before the first simulation of an episode.
    pub fn validate(&self, params: &ControlParameters) -> Result<(), EnvironmentError> {
        for parameter in Parameter::ALL {
            let bounds = self.bounds(parameter);
            let value = params.get(parameter);
            if !bounds.contains(value) {
                return Err(EnvironmentError::InvalidParameter {
                    parameter,
                    value,
                    min: bounds.min,
                    max: bounds.max,
                });
            }
        }
        Ok(())
    }

    /// Applies every directive of `action` to `params` with clamping.
    pub fn apply(&self, action: &ActionVector, params: &ControlParameters) -> ControlParameters {
        action
            .iter()
            .fold(*params, |acc, (parameter, directive)| {
                let updated = self.bounds(parameter).apply(directive, acc.get(parameter));
                acc.with(parameter, updated)
            })
    }
}

impl Default for ParameterLimits {
    fn default() -> Self {
        Self {
            nbr_trains: ParameterBounds::new(20.0, 148.0, 1.0),
            density_max_opt: ParameterBounds::new(2.0, 5.0, 0.02),
            v_max: ParameterBounds::new(5.0, 22.0, 0.2),
            max_dwell: ParameterBounds::new(16.0, 45.0, 0.2),
        }
    }
}
