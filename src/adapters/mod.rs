//! Adapters Layer - External implementations
//!
//! - `csv_prices`: price history from CSV files (`PriceSource`)
//! - `report`: text and JSON rendering of simulation reports
//! - `cli`: clap-based command line

pub mod cli;
pub mod csv_prices;
pub mod report;

pub use csv_prices::CsvPriceSource;
pub use report::ReportFormat;
