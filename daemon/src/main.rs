//! Surety daemon: entry point for running the flight surety registry.

mod scenario;
mod simulator;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;

use surety_node::{init_logging, LogFormat, NodeConfig, SuretyNode};
use surety_types::{Address, Wei};

use crate::scenario::ScenarioOptions;

#[derive(Parser)]
#[command(name = "surety-daemon", about = "Flight surety registry daemon")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, env = "SURETY_CONFIG")]
    config: Option<PathBuf>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "SURETY_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "SURETY_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Seed for the registry's randomness source.
    #[arg(long, env = "SURETY_RNG_SEED")]
    seed: Option<u64>,

    /// Owner address allowed to pause the registry.
    #[arg(long, env = "SURETY_OWNER")]
    owner: Option<Address>,

    /// Collect Prometheus metrics and print them on exit.
    #[arg(long, env = "SURETY_ENABLE_METRICS")]
    metrics: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Run a scripted scenario end to end and print a JSON report.
    Simulate {
        /// Funded airlines to onboard (the genesis airline included).
        #[arg(long, default_value_t = 5)]
        airlines: u32,
        /// Number of simulated oracles.
        #[arg(long, default_value_t = 20)]
        oracles: u32,
        /// Flights registered by each airline.
        #[arg(long, default_value_t = 2)]
        flights: u32,
        /// Passengers insuring every flight.
        #[arg(long, default_value_t = 3)]
        passengers: u32,
        /// Premium each passenger pays per flight, in wei or whole ether.
        #[arg(long, default_value = "1 ether")]
        premium: Wei,
        /// Seconds to wait for every flight to settle.
        #[arg(long, default_value_t = 5)]
        timeout: u64,
    },
    /// Print the effective configuration as TOML.
    Config,
}

impl Cli {
    /// File config (or defaults) with CLI flags and env vars layered on top.
    fn node_config(&self) -> anyhow::Result<NodeConfig> {
        let mut config = match &self.config {
            Some(path) => NodeConfig::from_toml_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => NodeConfig::default(),
        };
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        if let Some(format) = self.log_format {
            config.log_format = format;
        }
        if let Some(seed) = self.seed {
            config.rng_seed = seed;
        }
        if let Some(owner) = self.owner {
            config.owner = owner;
        }
        config.enable_metrics |= self.metrics;
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.node_config()?;

    if let Command::Config = cli.command {
        print!("{}", config.to_toml_string()?);
        return Ok(());
    }

    init_logging(config.log_format, &config.log_level)?;
    let node = Arc::new(SuretyNode::from_config(config)?);

    match cli.command {
        Command::Simulate {
            airlines,
            oracles,
            flights,
            passengers,
            premium,
            timeout,
        } => {
            let opts = ScenarioOptions {
                airlines,
                oracles,
                flights_per_airline: flights,
                passengers,
                premium,
                settle_timeout: Duration::from_secs(timeout),
            };
            let report = scenario::run(node.clone(), opts).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Config => {}
    }

    if let Some(metrics) = node.metrics() {
        eprintln!("{}", metrics.encode()?);
    }
    tracing::info!("surety daemon exited cleanly");
    Ok(())
}
