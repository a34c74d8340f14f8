//! Domain Layer - Core data types for the simulation engine
//!
//! Pure types with no I/O. Price sources and renderers live behind the
//! ports layer.
//!
//! - `price_series`: historical (date, close) observations
//! - `returns`: drift and volatility estimated from a series
//! - `ensemble`: grid of simulated price paths
//! - `risk`: VaR, expected price and confidence interval
//! - `error`: validation failures shared by every engine stage

pub mod error;
pub mod price_series;
pub mod returns;
pub mod ensemble;
pub mod risk;

pub use error::SimulationError;
pub use price_series::{PricePoint, PriceSeries, SeriesError};
pub use returns::ReturnStatistics;
pub use ensemble::{ReferenceLine, SimulationEnsemble};
pub use risk::{percentile_sorted, RiskSummary};
