//! Engine Errors
//!
//! Validation failures raised by the estimator, simulator and summarizer.
//! All of them are deterministic: retrying with the same input fails again.

use thiserror::Error;

/// Errors raised by the simulation engine
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    #[error("Insufficient data: need at least {required} prices, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("Invalid price {value} at index {index}: prices must be positive and finite")]
    InvalidPrice { index: usize, value: f64 },

    #[error("Invalid simulation request: {0}")]
    InvalidRequest(String),

    #[error("Cannot summarize an ensemble with zero paths")]
    EmptyEnsemble,
}

impl SimulationError {
    /// Convenience constructor for request validation failures
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        SimulationError::InvalidRequest(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = SimulationError::InsufficientData { required: 2, actual: 1 };
        assert_eq!(err.to_string(), "Insufficient data: need at least 2 prices, got 1");

        let err = SimulationError::invalid_request("path_count must be >= 1, got 0");
        assert!(err.to_string().contains("path_count"));

        let err = SimulationError::InvalidPrice { index: 3, value: -1.0 };
        assert!(err.to_string().contains("index 3"));
    }
}
