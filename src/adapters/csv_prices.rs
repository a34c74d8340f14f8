//! CSV Price Source
//!
//! Reads `date,close` history from CSV files such as those exported from a
//! charting tool or a provider download. The header row is required; column
//! names are matched case-insensitively and other columns are ignored.
//! Dates may carry a time suffix (`2024-01-02 00:00:00-05:00`), only the
//! `YYYY-MM-DD` prefix is used.

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::domain::{PricePoint, PriceSeries};
use crate::ports::{PriceSource, PriceSourceError};

const DATE_COLUMN: &str = "date";
const CLOSE_COLUMN: &str = "close";

/// Loads price history from a CSV file or a directory of `<SYMBOL>.csv` files
#[derive(Debug, Clone)]
pub struct CsvPriceSource {
    location: PathBuf,
}

impl CsvPriceSource {
    /// `location` may be a file or a directory; `~` is expanded
    pub fn new(location: impl AsRef<str>) -> Self {
        let expanded = shellexpand::tilde(location.as_ref()).to_string();
        Self {
            location: PathBuf::from(expanded),
        }
    }

    pub fn location(&self) -> &Path {
        &self.location
    }

    /// File holding `symbol`'s history
    pub fn path_for(&self, symbol: &str) -> PathBuf {
        if self.location.is_dir() {
            self.location.join(format!("{}.csv", symbol))
        } else {
            self.location.clone()
        }
    }
}

impl PriceSource for CsvPriceSource {
    fn load(&self, symbol: &str) -> Result<PriceSeries, PriceSourceError> {
        let path = self.path_for(symbol);
        tracing::debug!("Loading {} prices from {}", symbol, path.display());

        let file = File::open(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => PriceSourceError::NotFound(format!(
                "{} ({})",
                symbol,
                path.display()
            )),
            _ => PriceSourceError::Io(e),
        })?;

        let series = parse_prices(file)?;
        tracing::info!("Loaded {} prices for {}", series.len(), symbol);
        Ok(series)
    }
}

/// Parse `date,close` CSV content into a series
pub fn parse_prices<R: Read>(reader: R) -> Result<PriceSeries, PriceSourceError> {
    let mut csv_reader = csv::Reader::from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|e| PriceSourceError::Parse(e.to_string()))?
        .clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
            .ok_or_else(|| PriceSourceError::Parse(format!("missing '{}' column", name)))
    };
    let date_idx = column(DATE_COLUMN)?;
    let close_idx = column(CLOSE_COLUMN)?;

    let mut points = Vec::new();
    for (line, record) in csv_reader.records().enumerate() {
        let record = record.map_err(|e| PriceSourceError::Parse(e.to_string()))?;
        // +2: one for the header, one for 1-based line numbers
        let row = line + 2;

        let raw_date = record.get(date_idx).unwrap_or_default().trim();
        let date = raw_date
            .get(..10)
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
            .ok_or_else(|| {
                PriceSourceError::Parse(format!("line {}: invalid date '{}'", row, raw_date))
            })?;

        let raw_close = record.get(close_idx).unwrap_or_default().trim();
        let close = raw_close.parse::<f64>().map_err(|_| {
            PriceSourceError::Parse(format!("line {}: invalid close '{}'", row, raw_close))
        })?;

        points.push(PricePoint::new(date, close));
    }

    Ok(PriceSeries::new(points)?)
}
