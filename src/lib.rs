//! Monte Carlo price risk engine
//!
//! Estimates drift and volatility from historical closing prices, simulates
//! an ensemble of geometric Brownian motion price paths and summarizes the
//! terminal distribution as Value-at-Risk, expected price and a 95%
//! confidence interval.
//!
//! # Modules
//!
//! - `domain`: Core data types (PriceSeries, SimulationEnsemble, RiskSummary)
//! - `engine`: Estimator, path simulator and risk summarizer
//! - `ports`: Trait abstractions (PriceSource)
//! - `adapters`: External implementations (CSV prices, reports, CLI)
//! - `config`: Configuration loading and validation
//! - `application`: Simulation service wiring the pipeline together

pub mod domain;
pub mod engine;
pub mod ports;
pub mod adapters;
pub mod config;
pub mod application;

pub use domain::{PriceSeries, ReturnStatistics, RiskSummary, SimulationEnsemble, SimulationError};
pub use engine::{PathSimulator, ReturnStatisticsEstimator, RiskSummarizer, SimulationRequest};
