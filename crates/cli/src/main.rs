//! Sales Prediction CLI
//!
//! A command-line front-end to the sales model: run a prediction for a
//! quantity and price, or inspect the model artifact.

mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{info, predict};
use predictor_lib::predictor::{GatewayConfig, DEFAULT_MODEL_PATH};
use predictor_lib::{DEFAULT_PRICE, DEFAULT_QUANTITY};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Sales Prediction CLI
#[derive(Parser)]
#[command(name = "sales")]
#[command(author, version, about = "CLI for the Sales Prediction App", long_about = None)]
pub struct Cli {
    /// Path to the model artifact (.onnx or .json)
    #[arg(long, env = "SALES_MODEL_PATH", default_value = DEFAULT_MODEL_PATH, global = true)]
    pub model: PathBuf,

    /// Expected SHA256 of the model file
    #[arg(long, env = "SALES_MODEL_SHA256", global = true)]
    pub sha256: Option<String>,

    /// Output format
    #[arg(long, short, default_value = "table", global = true)]
    pub format: output::OutputFormat,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Predict total sales for a quantity and unit price
    Predict {
        /// Quantity ordered
        #[arg(long, short, default_value_t = DEFAULT_QUANTITY)]
        quantity: u64,

        /// Price of each item in dollars
        #[arg(long, short, default_value_t = DEFAULT_PRICE)]
        price: f64,
    },

    /// Show details of the model artifact
    Info,
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .compact()
        .init();

    if let Err(e) = run(cli) {
        output::print_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let gateway_config = GatewayConfig {
        model_path: cli.model,
        expected_sha256: cli.sha256,
        instance: "sales-cli".to_string(),
    };

    match cli.command {
        Commands::Predict { quantity, price } => {
            predict::run_prediction(gateway_config, quantity, price, cli.format)?;
        }
        Commands::Info => {
            info::show_info(gateway_config, cli.format)?;
        }
    }

    Ok(())
}
