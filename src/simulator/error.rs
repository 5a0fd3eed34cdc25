use thiserror::Error;

/// Failures of the external simulator.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimulatorError {
    #[error("simulator unavailable: {0}")]
    Unavailable(String),

    #[error("simulator output is missing metric `{0}`")]
    MissingMetric(String),

    #[error("simulator output has unexpected metric `{0}`")]
    UnknownMetric(String),

    #[error("simulator output metric `{key}` is not finite: {value}")]
    NonFiniteMetric { key: String, value: f64 },
}

impl SimulatorError {
    /// True for malformed or incomplete result sets.
    pub fn is_protocol(&self) -> bool {
        !matches!(self, SimulatorError::Unavailable(_))
    }

    /// True when another attempt may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SimulatorError::Unavailable(_))
    }
}
