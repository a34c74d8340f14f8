//! Risk Summary
//!
//! Point estimates and interval bounds of a terminal price distribution.
//! Percentiles use linear interpolation between order statistics:
//! `rank = p / 100 * (n - 1)`.

use serde::{Deserialize, Serialize};

/// Percentile backing the 95% Value-at-Risk
pub const VAR_PERCENTILE: f64 = 5.0;
/// Lower bound of the 95% confidence interval
pub const CI_LOW_PERCENTILE: f64 = 2.5;
/// Upper bound of the 95% confidence interval
pub const CI_HIGH_PERCENTILE: f64 = 97.5;

/// Risk metrics derived from the terminal column of an ensemble
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskSummary {
    /// 5th percentile of terminal prices
    pub var_95: f64,
    /// Mean terminal price
    pub expected_price: f64,
    /// 2.5th percentile of terminal prices
    pub ci_low_95: f64,
    /// 97.5th percentile of terminal prices
    pub ci_high_95: f64,
}

impl RiskSummary {
    /// Loss amount at the 95% level relative to a starting price
    ///
    /// Negative when even the 5th percentile path ends above `last_price`.
    pub fn downside_from(&self, last_price: f64) -> f64 {
        last_price - self.var_95
    }

    /// Width of the 95% confidence interval
    pub fn ci_width(&self) -> f64 {
        self.ci_high_95 - self.ci_low_95
    }
}

/// Linearly interpolated percentile of already sorted data
///
/// `p` is in percent. Returns `None` for empty input or `p` outside 0-100
/// (NaN included).
pub fn percentile_sorted(sorted: &[f64], p: f64) -> Option<f64> {
    let n = sorted.len();
    if n == 0 || !(0.0..=100.0).contains(&p) {
        return None;
    }
    if n == 1 {
        return Some(sorted[0]);
    }

    let rank = (p / 100.0) * (n - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;

    if lower == upper {
        Some(sorted[lower])
    } else {
        let w = rank - lower as f64;
        Some(sorted[lower] + (sorted[upper] - sorted[lower]) * w)
    }
}
