//! Simulation Parameters
//!
//! Request handed to the path simulator, plus the run configuration the
//! application layer turns into requests. Defaults are 500 paths over a
//! 90 step horizon.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::return_estimator::MIN_VOLATILITY_PRICES;
use crate::domain::{ReturnStatistics, SimulationError};

/// Default number of simulated paths
pub const DEFAULT_PATH_COUNT: usize = 500;
/// Default horizon in steps (trading days)
pub const DEFAULT_HORIZON_STEPS: usize = 90;
/// Path count at which row generation switches to the rayon pool
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 256;
/// Paths simulated per chunk in cancellable runs
pub const DEFAULT_CHUNK_SIZE: usize = 250;
/// Upper bound on paths accepted from configuration or the command line
pub const MAX_PATH_COUNT: usize = 10_000_000;
/// Largest ensemble grid, in prices, that fits one allocation
pub const MAX_GRID_CELLS: usize = isize::MAX as usize / std::mem::size_of::<f64>();

/// A single simulation request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationRequest {
    /// Starting price shared by every path
    pub last_price: f64,
    /// Per-step mean proportional return
    pub drift: f64,
    /// Per-step return standard deviation
    pub volatility: f64,
    /// Number of steps to simulate after the starting price
    pub horizon_steps: usize,
    /// Number of independent paths
    pub path_count: usize,
    /// Base seed; None draws one from the OS entropy source
    pub seed: Option<u64>,
}

impl SimulationRequest {
    pub fn new(
        last_price: f64,
        drift: f64,
        volatility: f64,
        horizon_steps: usize,
        path_count: usize,
    ) -> Self {
        Self {
            last_price,
            drift,
            volatility,
            horizon_steps,
            path_count,
            seed: None,
        }
    }

    /// Build a request from estimated statistics
    pub fn from_statistics(
        last_price: f64,
        stats: &ReturnStatistics,
        horizon_steps: usize,
        path_count: usize,
    ) -> Self {
        Self::new(last_price, stats.drift, stats.volatility, horizon_steps, path_count)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Per-step log drift of the GBM recurrence: `drift - volatility^2 / 2`
    pub fn log_drift(&self) -> f64 {
        self.drift - 0.5 * self.volatility.powi(2)
    }

    /// Number of prices in the ensemble grid, `None` if it cannot be allocated
    pub fn grid_cells(&self) -> Option<usize> {
        self.horizon_steps
            .checked_add(1)
            .and_then(|columns| self.path_count.checked_mul(columns))
            .filter(|cells| *cells <= MAX_GRID_CELLS)
    }

    /// Check the request invariants. Nothing is clamped or coerced.
    pub fn validate(&self) -> Result<(), SimulationError> {
        if self.path_count < 1 {
            return Err(SimulationError::invalid_request(format!(
                "path_count must be >= 1, got {}",
                self.path_count
            )));
        }
        if self.horizon_steps < 1 {
            return Err(SimulationError::invalid_request(format!(
                "horizon_steps must be >= 1, got {}",
                self.horizon_steps
            )));
        }
        if !self.last_price.is_finite() || self.last_price <= 0.0 {
            return Err(SimulationError::invalid_request(format!(
                "last_price must be positive and finite, got {}",
                self.last_price
            )));
        }
        if !self.drift.is_finite() {
            return Err(SimulationError::invalid_request(format!(
                "drift must be finite, got {}",
                self.drift
            )));
        }
        if !self.volatility.is_finite() || self.volatility < 0.0 {
            return Err(SimulationError::invalid_request(format!(
                "volatility must be finite and >= 0, got {}",
                self.volatility
            )));
        }
        if self.grid_cells().is_none() {
            return Err(SimulationError::invalid_request(format!(
                "{} paths x {} steps exceeds the addressable grid size",
                self.path_count, self.horizon_steps
            )));
        }
        Ok(())
    }
}

/// Parameter errors in a run configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamsError {
    #[error("path_count must be > 0")]
    ZeroPaths,
    #[error("path_count must be <= {max}, got {actual}")]
    TooManyPaths { max: usize, actual: usize },
    #[error("horizon_steps must be > 0")]
    ZeroHorizon,
    #[error("chunk_size must be > 0")]
    ZeroChunkSize,
    #[error("lookback must be >= 3 to estimate volatility, got {0}")]
    InvalidLookback(usize),
}

/// Run configuration used by the application layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub path_count: usize,
    pub horizon_steps: usize,
    pub seed: Option<u64>,
    /// Minimum path count for parallel row generation
    pub parallel_threshold: usize,
    /// Paths per chunk when a run can be cancelled
    pub chunk_size: usize,
    /// Use only the most recent `lookback` prices for estimation
    pub lookback: Option<usize>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            path_count: DEFAULT_PATH_COUNT,
            horizon_steps: DEFAULT_HORIZON_STEPS,
            seed: None,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
            chunk_size: DEFAULT_CHUNK_SIZE,
            lookback: None,
        }
    }
}

impl SimulationConfig {
    pub fn with_paths(mut self, path_count: usize) -> Self {
        self.path_count = path_count;
        self
    }

    pub fn with_horizon(mut self, horizon_steps: usize) -> Self {
        self.horizon_steps = horizon_steps;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_lookback(mut self, lookback: usize) -> Self {
        self.lookback = Some(lookback);
        self
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.path_count == 0 {
            return Err(ParamsError::ZeroPaths);
        }
        if self.path_count > MAX_PATH_COUNT {
            return Err(ParamsError::TooManyPaths {
                max: MAX_PATH_COUNT,
                actual: self.path_count,
            });
        }
        if self.horizon_steps == 0 {
            return Err(ParamsError::ZeroHorizon);
        }
        if self.chunk_size == 0 {
            return Err(ParamsError::ZeroChunkSize);
        }
        if let Some(lookback) = self.lookback {
            if lookback < MIN_VOLATILITY_PRICES {
                return Err(ParamsError::InvalidLookback(lookback));
            }
        }
        Ok(())
    }

    /// Request for a given starting price and estimated statistics
    pub fn request_for(&self, last_price: f64, stats: &ReturnStatistics) -> SimulationRequest {
        SimulationRequest {
            seed: self.seed,
            ..SimulationRequest::from_statistics(last_price, stats, self.horizon_steps, self.path_count)
        }
    }
}
