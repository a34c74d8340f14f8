//! Price Source Port
//!
//! Where historical closing prices come from. The engine never fetches data
//! itself; adapters implement this trait and the application layer calls it.

use thiserror::Error;

use crate::domain::{PriceSeries, SeriesError};

/// Price source error type
#[derive(Error, Debug)]
pub enum PriceSourceError {
    #[error("No price data for {0}")]
    NotFound(String),

    #[error("Failed to read price data: {0}")]
    Io(#[from] std::io::Error),

    #[error("Price data parsing error: {0}")]
    Parse(String),

    #[error("Malformed price series: {0}")]
    Series(#[from] SeriesError),
}

/// Supplies a time-ordered closing-price series for a symbol
pub trait PriceSource: Send + Sync {
    /// Load the full available history for `symbol`
    fn load(&self, symbol: &str) -> Result<PriceSeries, PriceSourceError>;
}
