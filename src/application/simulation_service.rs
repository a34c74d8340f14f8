//! Simulation Service
//!
//! Coordinates a price source with the engine: load history, estimate
//! statistics, simulate from the latest close and summarize. Every input is
//! passed explicitly; the service keeps no state between runs.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

use crate::domain::{
    PriceSeries, ReferenceLine, ReturnStatistics, RiskSummary, SimulationEnsemble,
    SimulationError,
};
use crate::engine::{
    ParamsError, PathSimulator, ReturnStatisticsEstimator, RiskSummarizer, SimulationConfig,
    SimulationPlan, SimulationRequest,
};
use crate::ports::{PriceSource, PriceSourceError};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ParamsError),
    #[error(transparent)]
    PriceSource(#[from] PriceSourceError),
    #[error(transparent)]
    Simulation(#[from] SimulationError),
    #[error("Simulation cancelled after {completed} of {total} paths")]
    Cancelled { completed: usize, total: usize },
}

/// Everything a presentation layer needs from one simulation run
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub symbol: String,
    /// Date of the price the simulation starts from
    pub as_of: Option<NaiveDate>,
    pub statistics: ReturnStatistics,
    pub request: SimulationRequest,
    /// Base seed actually used (drawn from entropy for unseeded requests)
    pub seed: u64,
    pub summary: RiskSummary,
    pub reference_line: ReferenceLine,
    /// Every simulated path, only when requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paths: Option<Vec<Vec<f64>>>,
    #[serde(skip)]
    pub ensemble: SimulationEnsemble,
}

/// Runs the estimate -> simulate -> summarize pipeline for a symbol
pub struct MonteCarloService<S: PriceSource> {
    source: S,
    config: SimulationConfig,
    estimator: ReturnStatisticsEstimator,
    simulator: PathSimulator,
    summarizer: RiskSummarizer,
    include_paths: bool,
}

/// Series, statistics and plan shared by one-shot and chunked runs
struct Prepared {
    as_of: Option<NaiveDate>,
    statistics: ReturnStatistics,
    plan: SimulationPlan,
}

impl<S: PriceSource> MonteCarloService<S> {
    /// Create a service, validating the run configuration
    pub fn new(source: S, config: SimulationConfig) -> Result<Self, ServiceError> {
        config.validate()?;

        let mut estimator = ReturnStatisticsEstimator::new();
        if let Some(lookback) = config.lookback {
            estimator = estimator.with_lookback(lookback);
        }
        let simulator = PathSimulator::new().with_parallel_threshold(config.parallel_threshold);

        Ok(Self {
            source,
            config,
            estimator,
            simulator,
            summarizer: RiskSummarizer::new(),
            include_paths: false,
        })
    }

    /// Include every path in the serialized report
    pub fn with_paths_in_report(mut self, include: bool) -> Self {
        self.include_paths = include;
        self
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Load history for `symbol` and estimate its return statistics
    pub fn estimate(&self, symbol: &str) -> Result<(PriceSeries, ReturnStatistics), ServiceError> {
        let series = self.source.load(symbol)?;
        let statistics = self.estimator.estimate(&series)?;
        Ok((series, statistics))
    }

    /// Run a full simulation in one pass
    pub fn run(&self, symbol: &str) -> Result<SimulationReport, ServiceError> {
        let prepared = self.prepare(symbol)?;
        let ensemble = self.simulator.run(&prepared.plan)?;
        self.finish(symbol, prepared, ensemble)
    }

    /// Run in chunks of `chunk_size` paths, stopping if `cancel` is set
    ///
    /// The flag is checked between chunks. A completed run is identical to
    /// `run` with the same seed.
    pub fn run_with_cancel(
        &self,
        symbol: &str,
        cancel: &AtomicBool,
    ) -> Result<SimulationReport, ServiceError> {
        let prepared = self.prepare(symbol)?;
        let plan = &prepared.plan;
        let total = plan.path_count();

        let mut blocks = Vec::with_capacity(total.div_ceil(self.config.chunk_size));
        let mut start = 0;
        while start < total {
            if cancel.load(Ordering::Relaxed) {
                tracing::warn!("Simulation for {} cancelled at {}/{} paths", symbol, start, total);
                return Err(ServiceError::Cancelled {
                    completed: start,
                    total,
                });
            }
            let end = (start + self.config.chunk_size).min(total);
            blocks.push(self.simulator.simulate_block(plan, start..end)?);
            tracing::debug!("Simulated paths {}..{} of {}", start, end, total);
            start = end;
        }

        let ensemble = plan.assemble(blocks)?;
        self.finish(symbol, prepared, ensemble)
    }

    fn prepare(&self, symbol: &str) -> Result<Prepared, ServiceError> {
        let (series, statistics) = self.estimate(symbol)?;

        // estimate() guarantees at least two valid prices
        let last = series.last().copied().ok_or(SimulationError::InsufficientData {
            required: 2,
            actual: 0,
        })?;

        if statistics.volatility == 0.0 {
            tracing::warn!("{} has zero volatility, all paths will be identical", symbol);
        }

        let request = self.config.request_for(last.close, &statistics);
        let plan = SimulationPlan::new(&request)?;

        tracing::info!(
            "Simulating {}: {} paths x {} steps from ${:.2} (seed {})",
            symbol,
            request.path_count,
            request.horizon_steps,
            last.close,
            plan.seed()
        );

        Ok(Prepared {
            as_of: Some(last.date),
            statistics,
            plan,
        })
    }

    fn finish(
        &self,
        symbol: &str,
        prepared: Prepared,
        ensemble: SimulationEnsemble,
    ) -> Result<SimulationReport, ServiceError> {
        let summary = self.summarizer.summarize(&ensemble)?;

        tracing::info!(
            "{}: VaR95 ${:.2}, expected ${:.2}, 95% CI ${:.2}-${:.2}",
            symbol,
            summary.var_95,
            summary.expected_price,
            summary.ci_low_95,
            summary.ci_high_95
        );

        Ok(SimulationReport {
            symbol: symbol.to_string(),
            as_of: prepared.as_of,
            statistics: prepared.statistics,
            request: *prepared.plan.request(),
            seed: prepared.plan.seed(),
            summary,
            reference_line: ensemble.reference_line(),
            paths: self.include_paths.then(|| ensemble.to_rows()),
            ensemble,
        })
    }
}
