//! CLI configuration utilities

use anyhow::{Context, Result};
use inkpost_core::{ClientConfig, StateDir};
use std::path::PathBuf;

/// Values given on the command line, applied over the loaded configuration
#[derive(Debug, Default)]
pub struct Overrides {
    pub config_file: Option<PathBuf>,
    pub state_dir: Option<PathBuf>,
    pub api_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// Load the client configuration
///
/// Without `--config`, the platform config file is used when it exists.
pub fn load(overrides: &Overrides) -> Result<ClientConfig> {
    let state_dir = overrides
        .state_dir
        .clone()
        .map_or_else(StateDir::new, StateDir::with_override);

    let file = match &overrides.config_file {
        Some(path) => Some(path.clone()),
        None => Some(state_dir.config_file()).filter(|path| path.exists()),
    };

    let mut config = ClientConfig::load(file.as_deref()).with_context(|| match &file {
        Some(path) => format!("Failed to load configuration from {}", path.display()),
        None => "Failed to load configuration".to_string(),
    })?;

    if let Some(dir) = &overrides.state_dir {
        config.state_dir = Some(dir.clone());
    }
    if let Some(url) = &overrides.api_url {
        config.api.base_url.clone_from(url);
    }
    if let Some(timeout) = overrides.timeout_secs {
        config.api.timeout_secs = timeout;
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}
