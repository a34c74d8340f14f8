//! Terminal Distribution Risk Summary
//!
//! Reduces the final column of an ensemble to VaR, expected price and a 95%
//! confidence interval. Works on any ensemble, however it was produced.

use crate::domain::risk::{
    percentile_sorted, CI_HIGH_PERCENTILE, CI_LOW_PERCENTILE, VAR_PERCENTILE,
};
use crate::domain::{RiskSummary, SimulationEnsemble, SimulationError};

/// Summarizes simulated terminal prices
#[derive(Debug, Clone, Copy, Default)]
pub struct RiskSummarizer;

impl RiskSummarizer {
    pub fn new() -> Self {
        Self
    }

    /// Compute the risk summary of an ensemble
    ///
    /// # Errors
    /// `EmptyEnsemble` when the ensemble has no paths.
    pub fn summarize(&self, ensemble: &SimulationEnsemble) -> Result<RiskSummary, SimulationError> {
        let terminal = sorted_terminal(ensemble)?;
        let n = terminal.len() as f64;
        let expected_price = terminal.iter().sum::<f64>() / n;

        let pct = |p: f64| percentile_sorted(&terminal, p).ok_or(SimulationError::EmptyEnsemble);
        let summary = RiskSummary {
            var_95: pct(VAR_PERCENTILE)?,
            expected_price,
            ci_low_95: pct(CI_LOW_PERCENTILE)?,
            ci_high_95: pct(CI_HIGH_PERCENTILE)?,
        };

        tracing::debug!(
            "Summarized {} terminal prices: VaR95 {:.4}, expected {:.4}, CI [{:.4}, {:.4}]",
            terminal.len(),
            summary.var_95,
            summary.expected_price,
            summary.ci_low_95,
            summary.ci_high_95
        );

        Ok(summary)
    }

    /// Arbitrary percentile (0-100) of the terminal distribution
    ///
    /// # Errors
    /// `InvalidRequest` when `p` is outside 0-100 or NaN, `EmptyEnsemble`
    /// when the ensemble has no paths.
    pub fn percentile(&self, ensemble: &SimulationEnsemble, p: f64) -> Result<f64, SimulationError> {
        if !(0.0..=100.0).contains(&p) {
            return Err(SimulationError::invalid_request(format!(
                "percentile must be within 0-100, got {}",
                p
            )));
        }
        let terminal = sorted_terminal(ensemble)?;
        percentile_sorted(&terminal, p).ok_or(SimulationError::EmptyEnsemble)
    }
}

fn sorted_terminal(ensemble: &SimulationEnsemble) -> Result<Vec<f64>, SimulationError> {
    if ensemble.is_empty() {
        return Err(SimulationError::EmptyEnsemble);
    }
    let mut terminal = ensemble.terminal_prices();
    terminal.sort_by(|a, b| a.total_cmp(b));
    Ok(terminal)
}
