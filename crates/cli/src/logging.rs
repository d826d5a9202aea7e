use anyhow::Result;
use std::fs::OpenOptions;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging for the CLI
///
/// Logs go to stderr, and to `log_file` as well when one is given.
/// `RUST_LOG` takes precedence over `log_level`.
pub fn init_logging(log_level: Level, log_file: Option<PathBuf>) -> Result<()> {
    match log_file {
        Some(path) => init_file_logging(log_level, path),
        None => {
            tracing_subscriber::registry()
                .with(env_filter(log_level))
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
            Ok(())
        }
    }
}

fn env_filter(level: Level) -> EnvFilter {
    let level_str = level.as_str().to_lowercase();
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("inkpost={level_str},inkpost_core={level_str},inkpost_http={level_str}").into()
    })
}

fn init_file_logging(level: Level, path: PathBuf) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    // Each invocation is short, so keep history across runs
    let log_file = OpenOptions::new().create(true).append(true).open(&path)?;

    tracing_subscriber::registry()
        .with(env_filter(level))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(log_file)
                .with_ansi(false),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    Ok(())
}
