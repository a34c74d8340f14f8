//! Historical Price Series
//!
//! Time-ordered closing prices supplied by a price source. Construction
//! enforces date ordering only; price validity is checked by the estimator
//! so that a bad close is reported with its position.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structural problems with a price series
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SeriesError {
    #[error("Dates out of order at index {index}: {date} follows {previous}")]
    OutOfOrder {
        index: usize,
        date: NaiveDate,
        previous: NaiveDate,
    },
    #[error("Duplicate date {date} at index {index}")]
    DuplicateDate { index: usize, date: NaiveDate },
}

/// A single (date, close) observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close }
    }
}

/// Chronologically increasing closing prices with no duplicate dates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Build a series, rejecting out-of-order or repeated dates
    pub fn new(points: Vec<PricePoint>) -> Result<Self, SeriesError> {
        for (index, pair) in points.windows(2).enumerate() {
            let (previous, current) = (pair[0].date, pair[1].date);
            if current == previous {
                return Err(SeriesError::DuplicateDate {
                    index: index + 1,
                    date: current,
                });
            }
            if current < previous {
                return Err(SeriesError::OutOfOrder {
                    index: index + 1,
                    date: current,
                    previous,
                });
            }
        }
        Ok(Self { points })
    }

    /// Build a series from bare closes, dated on consecutive days from 1970-01-01
    pub fn from_closes<I>(closes: I) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        let points = NaiveDate::default()
            .iter_days()
            .zip(closes)
            .map(|(date, close)| PricePoint::new(date, close))
            .collect();
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    /// Closing prices in chronological order
    pub fn closes(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.close)
    }

    /// Most recent observation, used as the simulation starting price
    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    pub fn last_close(&self) -> Option<f64> {
        self.last().map(|p| p.close)
    }

    /// Keep only the `n` most recent observations
    pub fn tail(&self, n: usize) -> PriceSeries {
        let start = self.points.len().saturating_sub(n);
        Self {
            points: self.points[start..].to_vec(),
        }
    }
}
