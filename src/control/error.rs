use thiserror::Error;

use super::parameters::Parameter;
use crate::simulator::SimulatorError;

/// Errors raised by the control environment.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EnvironmentError {
    #[error("{parameter} value {value} is not acceptable: expected a value within [{min}, {max}]")]
    InvalidParameter {
        parameter: Parameter,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error(transparent)]
    Simulator(#[from] SimulatorError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_parameter_display() {
        let e = EnvironmentError::InvalidParameter {
            parameter: Parameter::VMax,
            value: 30.0,
            min: 5.0,
            max: 22.0,
        };
        assert_eq!(
            e.to_string(),
            "maximum speed value 30 is not acceptable: expected a value within [5, 22]"
        );
    }

    #[test]
    fn simulator_error_is_wrapped_transparently() {
        let e: EnvironmentError = SimulatorError::Unavailable("no response".into()).into();
        assert_eq!(e.to_string(), "simulator unavailable: no response");
    }
}
