//! Error type shared by every solver and transform.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum SimulationError {
    /// Shock kind string that is not one of `wage`, `hours`, `tax`.
    #[error("unsupported shock kind: {0:?}")]
    UnsupportedShockKind(String),

    /// Rejected before any simulation work starts.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A computed state contained a NaN or infinite value.
    #[error("simulation diverged at period {period}: {field} is not finite")]
    SimulationDivergence { period: usize, field: String },
}

impl SimulationError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = SimulationError::UnsupportedShockKind("bonus".into());
        assert_eq!(err.to_string(), "unsupported shock kind: \"bonus\"");

        let err = SimulationError::SimulationDivergence {
            period: 3,
            field: "gdp".into(),
        };
        assert_eq!(err.to_string(), "simulation diverged at period 3: gdp is not finite");
    }
}
