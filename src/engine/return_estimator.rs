//! Return Statistics Estimation
//!
//! Derives drift and volatility from a historical closing-price series using
//! simple proportional returns:
//! - r_t = price_t / price_{t-1} - 1
//! - drift = mean(r_t)
//! - volatility = sample std(r_t), denominator n - 1
//!
//! Returns are simple percentage changes, not log returns.

use statrs::statistics::Statistics;

use crate::domain::{PriceSeries, ReturnStatistics, SimulationError};

/// Minimum prices needed to form one return
pub const MIN_PRICES: usize = 2;
/// Minimum prices needed for a sample standard deviation of returns
pub const MIN_VOLATILITY_PRICES: usize = 3;

/// Estimates return statistics from a price series
#[derive(Debug, Clone, Default)]
pub struct ReturnStatisticsEstimator {
    /// Only the most recent `lookback` prices are used when set
    lookback: Option<usize>,
}

impl ReturnStatisticsEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict estimation to the most recent `lookback` prices
    pub fn with_lookback(mut self, lookback: usize) -> Self {
        self.lookback = Some(lookback);
        self
    }

    pub fn lookback(&self) -> Option<usize> {
        self.lookback
    }

    /// Estimate drift and volatility
    ///
    /// # Errors
    /// - `InsufficientData` when fewer than two prices are available, or
    ///   exactly two (one return has no sample standard deviation)
    /// - `InvalidPrice` when any price is non-positive or non-finite
    pub fn estimate(&self, series: &PriceSeries) -> Result<ReturnStatistics, SimulationError> {
        let window;
        let series = match self.lookback {
            Some(n) if n < series.len() => {
                window = series.tail(n);
                &window
            }
            _ => series,
        };

        if series.len() < MIN_PRICES {
            return Err(SimulationError::InsufficientData {
                required: MIN_PRICES,
                actual: series.len(),
            });
        }

        let closes: Vec<f64> = series.closes().collect();
        if let Some((index, &value)) = closes
            .iter()
            .enumerate()
            .find(|(_, p)| !p.is_finite() || **p <= 0.0)
        {
            return Err(SimulationError::InvalidPrice { index, value });
        }

        if closes.len() < MIN_VOLATILITY_PRICES {
            return Err(SimulationError::InsufficientData {
                required: MIN_VOLATILITY_PRICES,
                actual: closes.len(),
            });
        }

        let returns = proportional_returns(&closes);
        let sample_size = returns.len();
        let drift = returns.iter().mean();
        let volatility = returns.iter().std_dev();

        tracing::debug!(
            "Estimated drift {:.6}, volatility {:.6} from {} returns",
            drift,
            volatility,
            sample_size
        );

        Ok(ReturnStatistics {
            drift,
            volatility,
            sample_size,
        })
    }
}

/// Single-period proportional returns of adjacent prices
pub fn proportional_returns(prices: &[f64]) -> Vec<f64> {
    prices.windows(2).map(|w| w[1] / w[0] - 1.0).collect()
}
