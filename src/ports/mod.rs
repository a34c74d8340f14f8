//! Ports Layer - Trait definitions for external collaborators
//!
//! The engine only consumes a price series; retrieving it is an external
//! concern behind `PriceSource`. `mocks` holds in-memory implementations.

pub mod price_source;
pub mod mocks;

pub use price_source::{PriceSource, PriceSourceError};
pub use mocks::{MockPriceSource, StaticPriceSource};
