//! Jobhub CLI - session-aware client for the Jobhub API

mod commands;
mod config;
mod logging;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use commands::Commands;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{Level, error, info};

#[derive(Parser)]
#[command(name = "jobhub")]
#[command(about = "Talk to the Jobhub API with a persisted session")]
#[command(version)]
struct Cli {
    /// Set logging level
    #[arg(short = 'l', long, global = true, default_value = "warn")]
    log_level: LogLevel,

    /// State directory for the session jar, logs and config
    #[arg(short = 'd', long, global = true, env = "JOBHUB_STATE_DIR")]
    data_dir: Option<PathBuf>,

    /// Configuration file (TOML)
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    /// Timeout for operations in seconds (0 = no timeout)
    #[arg(short = 't', long, global = true, default_value = "30")]
    timeout: u64,

    /// Disable file logging (only log to stderr)
    #[arg(long, global = true)]
    no_file_log: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = config::Settings::load(cli.config.as_deref(), cli.data_dir)?;
    logging::init_logging(cli.log_level.into(), &settings.state_dir, cli.no_file_log)?;

    info!(api = %settings.api_url, "Starting Jobhub CLI");

    let outcome = if cli.timeout == 0 {
        cli.command.execute(&settings).await
    } else {
        let limit = Duration::from_secs(cli.timeout);
        match tokio::time::timeout(limit, cli.command.execute(&settings)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(anyhow::anyhow!(
                "Command timed out after {} seconds",
                cli.timeout
            )),
        }
    };

    if let Err(e) = outcome {
        error!("Command failed: {e:#}");
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }

    Ok(())
}

#[derive(Clone, Debug, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for Level {
    fn from(log_level: LogLevel) -> Self {
        match log_level {
            LogLevel::Error => Self::ERROR,
            LogLevel::Warn => Self::WARN,
            LogLevel::Info => Self::INFO,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Trace => Self::TRACE,
        }
    }
}
