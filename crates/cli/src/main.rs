//! Inkpost CLI - command-line client for the Inkpost blog

mod commands;
mod config;
mod logging;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use commands::Commands;
use inkpost_http::ClientError;
use std::path::PathBuf;
use tracing::{Level, debug, error};

#[derive(Parser)]
#[command(name = "inkpost")]
#[command(about = "Browse, write and administer an Inkpost blog")]
#[command(version)]
struct Cli {
    /// Set logging level
    #[arg(short = 'l', long, global = true, default_value = "warn")]
    log_level: LogLevel,

    /// Directory holding the saved session and the log file
    #[arg(short = 'd', long, global = true, env = "INKPOST_STATE_DIR")]
    state_dir: Option<PathBuf>,

    /// Configuration file (TOML or YAML)
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    /// Base URL of the blog API
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Request timeout in seconds
    #[arg(short = 't', long, global = true)]
    timeout: Option<u64>,

    /// Disable file logging (only log to stderr)
    #[arg(long, global = true)]
    no_file_log: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = config::load(&config::Overrides {
        config_file: cli.config.clone(),
        state_dir: cli.state_dir.clone(),
        api_url: cli.api_url.clone(),
        timeout_secs: cli.timeout,
    })?;

    let log_file = (!cli.no_file_log).then(|| config.state_dir().log_file());
    logging::init_logging(cli.log_level.into(), log_file)?;

    debug!(base_url = %config.api.base_url, "Starting Inkpost CLI");

    if let Err(e) = cli.command.execute(&config).await {
        error!("Command failed: {e:#}");
        eprintln!("{}", describe(&e));
        std::process::exit(1);
    }

    Ok(())
}

/// Text to show the user for a failed command
fn describe(err: &anyhow::Error) -> String {
    match err.downcast_ref::<ClientError>() {
        Some(ClientError::SessionExpired) => format!(
            "{} Run `inkpost login` to sign in.",
            ClientError::SessionExpired.user_message()
        ),
        Some(client_err) => client_err.user_message(),
        None => format!("{err:#}"),
    }
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
