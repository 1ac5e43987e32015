//! nanokit CLI entry point.

use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;

mod commands;
mod config;
mod logging;

use config::{FileConfig, Overrides, Settings};
use logging::LogFormat;

#[derive(Parser)]
#[command(name = "nanokit")]
#[command(about = "A toolkit for the Nano currency", long_about = None, version)]
struct Cli {
    /// Default log level when RUST_LOG is not set
    #[arg(long, global = true, env = "NANOKIT_LOG_LEVEL", default_value = "warn")]
    log_level: String,

    /// Log output format
    #[arg(long, global = true, env = "NANOKIT_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,

    /// JSON configuration file
    #[arg(long, global = true, env = "NANOKIT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: commands::Commands,
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let file = match &cli.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    let overrides = Overrides::from_command(&cli.command);
    let settings = Settings::resolve(&file, &overrides);
    tracing::debug!(?settings, "Resolved settings");

    commands::run(cli.command, &settings).await
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init_logging(&cli.log_level, cli.log_format);

    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}
