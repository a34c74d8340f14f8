//! Return Statistics
//!
//! Drift and volatility of single-period proportional returns.

use serde::{Deserialize, Serialize};

/// Statistics estimated from a historical price series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReturnStatistics {
    /// Mean single-period proportional return
    pub drift: f64,
    /// Sample standard deviation of single-period returns (n - 1 denominator)
    pub volatility: f64,
    /// Number of returns used, always `len(series) - 1`
    pub sample_size: usize,
}
