//! mcrisk - Monte Carlo price simulation CLI
//!
//! Estimates return statistics from historical closes, simulates GBM price
//! paths and reports Value-at-Risk and a 95% confidence interval.

use anyhow::Result;

use montecarlo_risk::adapters::cli;

fn main() -> Result<()> {
    // Load .env file if it exists (RUST_LOG and friends)
    dotenvy::dotenv().ok();

    let app = cli::init();
    cli::execute(app)
}
