//! Simulation Engine - Return estimation, GBM path simulation and risk summary
//!
//! Three stateless stages, each consuming the output of the previous one:
//! - `ReturnStatisticsEstimator`: price series -> drift and volatility
//! - `PathSimulator`: request -> ensemble of GBM price paths
//! - `RiskSummarizer`: ensemble -> VaR, expected price, 95% interval
//!
//! Every stage is a pure function of its inputs (plus the seed), so rerunning
//! a seeded request reproduces the same risk numbers.

pub mod params;
pub mod rng;
pub mod return_estimator;
pub mod path_simulator;
pub mod risk_summarizer;

pub use params::{SimulationConfig, SimulationRequest, ParamsError};
pub use return_estimator::{ReturnStatisticsEstimator, proportional_returns};
pub use path_simulator::{PathSimulator, SimulationPlan, EnsembleBlock};
pub use risk_summarizer::RiskSummarizer;
