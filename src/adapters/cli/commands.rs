//! CLI Command Handlers
//!
//! Implementation of the `simulate` and `estimate` commands.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::adapters::csv_prices::CsvPriceSource;
use crate::adapters::report::{self, ReportFormat};
use crate::application::MonteCarloService;
use crate::config::{load_config, Config};
use crate::engine::SimulationConfig;

/// mcrisk - Monte Carlo price simulation and Value-at-Risk
#[derive(Parser, Debug)]
#[command(
    name = "mcrisk",
    version = env!("CARGO_PKG_VERSION"),
    author = env!("CARGO_PKG_AUTHORS"),
    about = "Monte Carlo GBM price simulation with Value-at-Risk",
    long_about = "mcrisk estimates drift and volatility from historical closing prices, \
                  simulates future price paths under geometric Brownian motion and reports \
                  95% Value-at-Risk, expected price and a 95% confidence interval."
)]
pub struct CliApp {
    /// The command to execute
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Simulate future prices and report risk metrics
    Simulate(SimulateCmd),

    /// Estimate drift and volatility only
    Estimate(EstimateCmd),
}

impl Command {
    fn config_path(&self) -> Option<&PathBuf> {
        match self {
            Command::Simulate(cmd) => cmd.config.as_ref(),
            Command::Estimate(cmd) => cmd.config.as_ref(),
        }
    }
}

/// Run a simulation
#[derive(Parser, Debug)]
pub struct SimulateCmd {
    /// Ticker symbol (e.g., AAPL)
    #[arg(value_name = "SYMBOL")]
    pub symbol: String,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// CSV file, or directory of <SYMBOL>.csv files, with date and close columns
    #[arg(short, long, value_name = "PATH", default_value = "data")]
    pub prices: String,

    /// Number of simulated paths
    #[arg(long, value_name = "N")]
    pub paths: Option<usize>,

    /// Horizon in steps (days)
    #[arg(long, value_name = "DAYS")]
    pub horizon: Option<usize>,

    /// Seed for reproducible output
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Use only the most recent N prices for estimation
    #[arg(long, value_name = "N")]
    pub lookback: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum)]
    pub format: Option<ReportFormat>,

    /// Include every simulated path in JSON output
    #[arg(long)]
    pub include_paths: bool,
}

/// Estimate return statistics
#[derive(Parser, Debug)]
pub struct EstimateCmd {
    /// Ticker symbol (e.g., AAPL)
    #[arg(value_name = "SYMBOL")]
    pub symbol: String,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// CSV file, or directory of <SYMBOL>.csv files, with date and close columns
    #[arg(short, long, value_name = "PATH", default_value = "data")]
    pub prices: String,

    /// Use only the most recent N prices for estimation
    #[arg(long, value_name = "N")]
    pub lookback: Option<usize>,
}

/// Execute the CLI command
pub fn execute(app: CliApp) -> Result<()> {
    let config = match app.command.config_path() {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => Config::default(),
    };

    init_logging(app.verbose, app.debug, &config.logging.level)?;

    match app.command {
        Command::Simulate(cmd) => simulate_command(cmd, &config),
        Command::Estimate(cmd) => estimate_command(cmd, &config),
    }
}

/// Initialize logging system
fn init_logging(verbose: bool, debug: bool, default_level: &str) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let level = if debug {
        "debug"
    } else if verbose {
        "info"
    } else {
        default_level
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    Ok(())
}

/// Merge CLI overrides into the file configuration
fn simulation_config(cmd: &SimulateCmd, config: &Config) -> SimulationConfig {
    let mut sim = SimulationConfig::from(config);
    if let Some(paths) = cmd.paths {
        sim.path_count = paths;
    }
    if let Some(horizon) = cmd.horizon {
        sim.horizon_steps = horizon;
    }
    if let Some(seed) = cmd.seed {
        sim.seed = Some(seed);
    }
    if let Some(lookback) = cmd.lookback {
        sim.lookback = Some(lookback);
    }
    sim
}

/// Handle simulate command
fn simulate_command(cmd: SimulateCmd, config: &Config) -> Result<()> {
    tracing::info!("Starting simulation for {}", cmd.symbol);

    let sim_config = simulation_config(&cmd, config);
    let format = cmd.format.unwrap_or(config.output.format);
    let include_paths = cmd.include_paths || config.output.include_paths;

    let source = CsvPriceSource::new(&cmd.prices);
    let service = MonteCarloService::new(source, sim_config)
        .context("Invalid simulation parameters")?
        .with_paths_in_report(include_paths);

    let sim_report = service
        .run(&cmd.symbol)
        .with_context(|| format!("Simulation failed for {}", cmd.symbol))?;

    let rendered = report::render(&sim_report, format).context("Failed to render report")?;
    println!("{}", rendered);
    Ok(())
}

/// Handle estimate command
fn estimate_command(cmd: EstimateCmd, config: &Config) -> Result<()> {
    let mut sim_config = SimulationConfig::from(config);
    if let Some(lookback) = cmd.lookback {
        sim_config.lookback = Some(lookback);
    }

    let source = CsvPriceSource::new(&cmd.prices);
    let service =
        MonteCarloService::new(source, sim_config).context("Invalid estimation parameters")?;

    let (series, stats) = service
        .estimate(&cmd.symbol)
        .with_context(|| format!("Estimation failed for {}", cmd.symbol))?;

    println!("Return statistics for {}", cmd.symbol);
    if let Some(last) = series.last() {
        println!("  Last close: ${:.2} ({})", last.close, last.date);
    }
    println!("  Drift: {:.6}", stats.drift);
    println!("  Volatility: {:.6}", stats.volatility);
    println!("  Returns used: {}", stats.sample_size);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ParamsError;

    #[test]
    fn test_parse_simulate_command() {
        let app = CliApp::try_parse_from([
            "mcrisk", "simulate", "AAPL", "--paths", "1000", "--horizon", "90", "--seed", "42",
            "--format", "json",
        ])
        .unwrap();

        match app.command {
            Command::Simulate(cmd) => {
                assert_eq!(cmd.symbol, "AAPL");
                assert_eq!(cmd.paths, Some(1000));
                assert_eq!(cmd.horizon, Some(90));
                assert_eq!(cmd.seed, Some(42));
                assert_eq!(cmd.format, Some(ReportFormat::Json));
                assert_eq!(cmd.prices, "data");
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_global_flags() {
        let app = CliApp::try_parse_from(["mcrisk", "estimate", "MSFT", "--verbose"]).unwrap();
        assert!(app.verbose);
        assert!(!app.debug);
        assert!(matches!(app.command, Command::Estimate(_)));
    }

    #[test]
    fn test_cli_overrides_config() {
        let app = CliApp::try_parse_from(["mcrisk", "simulate", "AAPL", "--paths", "100"]).unwrap();
        let Command::Simulate(cmd) = app.command else {
            panic!("expected simulate");
        };

        let mut config = Config::default();
        config.simulation.seed = Some(9);
        config.simulation.horizon_steps = 30;

        let sim = simulation_config(&cmd, &config);
        assert_eq!(sim.path_count, 100);
        assert_eq!(sim.horizon_steps, 30);
        assert_eq!(sim.seed, Some(9));
    }

    #[test]
    fn test_zero_paths_not_clamped() {
        let app = CliApp::try_parse_from(["mcrisk", "simulate", "AAPL", "--paths", "0"]).unwrap();
        let Command::Simulate(cmd) = app.command else {
            panic!("expected simulate");
        };
        let sim = simulation_config(&cmd, &Config::default());
        assert_eq!(sim.path_count, 0);
        assert!(sim.validate().is_err());
    }

    #[test]
    fn test_paths_override_respects_cap() {
        let app =
            CliApp::try_parse_from(["mcrisk", "simulate", "AAPL", "--paths", "10000001"]).unwrap();
        let Command::Simulate(cmd) = app.command else {
            panic!("expected simulate");
        };
        let sim = simulation_config(&cmd, &Config::default());
        assert_eq!(sim.path_count, 10_000_001);
        assert!(matches!(sim.validate(), Err(ParamsError::TooManyPaths { .. })));
    }
}
