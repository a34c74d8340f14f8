//! In-memory price sources for tests and embedding callers.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::price_source::{PriceSource, PriceSourceError};
use crate::domain::PriceSeries;

/// Fixed series per symbol
#[derive(Debug, Default, Clone)]
pub struct StaticPriceSource {
    series: HashMap<String, PriceSeries>,
}

impl StaticPriceSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to register closes for a symbol
    pub fn with_closes(mut self, symbol: &str, closes: &[f64]) -> Self {
        self.series
            .insert(symbol.to_string(), PriceSeries::from_closes(closes.iter().copied()));
        self
    }

    pub fn with_series(mut self, symbol: &str, series: PriceSeries) -> Self {
        self.series.insert(symbol.to_string(), series);
        self
    }
}

impl PriceSource for StaticPriceSource {
    fn load(&self, symbol: &str) -> Result<PriceSeries, PriceSourceError> {
        self.series
            .get(symbol)
            .cloned()
            .ok_or_else(|| PriceSourceError::NotFound(symbol.to_string()))
    }
}

/// Mock price source that records requested symbols
#[derive(Debug, Default)]
pub struct MockPriceSource {
    inner: StaticPriceSource,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockPriceSource {
    pub fn new(inner: StaticPriceSource) -> Self {
        Self {
            inner,
            calls: Arc::default(),
        }
    }

    /// Get all recorded calls
    pub fn get_calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl PriceSource for MockPriceSource {
    fn load(&self, symbol: &str) -> Result<PriceSeries, PriceSourceError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(symbol.to_string());
        }
        self.inner.load(symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_source_returns_registered_series() {
        let source = StaticPriceSource::new().with_closes("AAPL", &[1.0, 2.0]);
        let series = source.load("AAPL").unwrap();
        assert_eq!(series.len(), 2);
    }

    #[test]
    fn test_static_source_unknown_symbol() {
        let source = StaticPriceSource::new();
        assert!(matches!(source.load("MSFT"), Err(PriceSourceError::NotFound(_))));
    }

    #[test]
    fn test_mock_records_calls() {
        let mock = MockPriceSource::new(StaticPriceSource::new().with_closes("AAPL", &[1.0, 2.0]));
        let _ = mock.load("AAPL");
        let _ = mock.load("TSLA");
        assert_eq!(mock.get_calls(), vec!["AAPL".to_string(), "TSLA".to_string()]);
    }
}
