//! Client configuration

use crate::error::ConfigError;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;
use url::Url;

/// Environment variable prefix, e.g. `INKPOST_API__BASE_URL`
pub const ENV_PREFIX: &str = "INKPOST";

/// Environment variable that overrides the state directory
pub const STATE_DIR_ENV: &str = "INKPOST_STATE_DIR";

/// Main client configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Remote API settings
    pub api: ApiConfig,

    /// Where the session file and logs live; platform default when unset
    #[serde(default)]
    pub state_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL every API path is resolved against
    pub base_url: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            timeout_secs: 30,
            user_agent: concat!("inkpost/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ApiConfig {
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl ClientConfig {
    /// Load configuration from defaults, an optional file and the environment
    ///
    /// The result is not validated, so callers can layer their own overrides
    /// first. Call [`validate`](Self::validate) before use.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or a value cannot be parsed
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let mut builder = config::Config::builder()
            .set_default("api.base_url", defaults.api.base_url)?
            .set_default("api.timeout_secs", defaults.api.timeout_secs)?
            .set_default("api.user_agent", defaults.api.user_agent)?;

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }

        let settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.api.base_url).map_err(|e| {
            ConfigError::invalid(format!("api.base_url '{}': {e}", self.api.base_url))
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::invalid(format!(
                "api.base_url must be http or https, got '{}'",
                url.scheme()
            )));
        }

        if self.api.timeout_secs == 0 {
            return Err(ConfigError::invalid("api.timeout_secs must be greater than 0"));
        }

        Ok(())
    }

    /// Resolved state directory
    pub fn state_dir(&self) -> StateDir {
        self.state_dir
            .as_ref()
            .map_or_else(StateDir::new, StateDir::with_override)
    }
}

/// Manages the platform-specific directory holding session data and logs
#[derive(Debug, Clone)]
pub struct StateDir {
    project_dirs: Option<ProjectDirs>,
    override_dir: Option<PathBuf>,
}

impl StateDir {
    /// Platform default, honouring `INKPOST_STATE_DIR`
    pub fn new() -> Self {
        if let Ok(dir) = std::env::var(STATE_DIR_ENV) {
            return Self::with_override(dir);
        }

        let project_dirs = ProjectDirs::from("org", "Inkpost", "inkpost");
        if project_dirs.is_none() {
            warn!("Failed to determine platform-specific directories, will use fallback");
        }
        Self {
            project_dirs,
            override_dir: None,
        }
    }

    pub fn with_override(path: impl Into<PathBuf>) -> Self {
        Self {
            project_dirs: None,
            override_dir: Some(path.into()),
        }
    }

    /// Directory for the persisted session
    pub fn data_dir(&self) -> PathBuf {
        if let Some(dir) = &self.override_dir {
            return dir.clone();
        }

        self.project_dirs.as_ref().map_or_else(
            || PathBuf::from(".inkpost"),
            |dirs| dirs.data_dir().to_path_buf(),
        )
    }

    pub fn config_file(&self) -> PathBuf {
        if let Some(dir) = &self.override_dir {
            return dir.join("config.toml");
        }

        self.project_dirs.as_ref().map_or_else(
            || PathBuf::from(".inkpost/config.toml"),
            |dirs| dirs.config_dir().join("config.toml"),
        )
    }

    pub fn log_file(&self) -> PathBuf {
        self.data_dir().join("inkpost.log")
    }
}

impl Default for StateDir {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = ClientConfig::default();
        config.validate().unwrap();
        assert_eq!(config.api.timeout(), Duration::from_secs(30));
        assert!(config.api.user_agent.starts_with("inkpost/"));
    }

    #[test]
    fn rejects_bad_urls() {
        let mut config = ClientConfig::default();
        config.api.base_url = "not a url".into();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));

        config.api.base_url = "ftp://example.com".into();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn rejects_zero_timeout() {
        let mut config = ClientConfig::default();
        config.api.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "state_dir = \"/tmp/inkpost-test\"\n[api]\nbase_url = \"https://blog.example.com\"\ntimeout_secs = 5"
        )
        .unwrap();

        let config = ClientConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.api.base_url, "https://blog.example.com");
        assert_eq!(config.api.timeout_secs, 5);
        assert_eq!(config.state_dir, Some(PathBuf::from("/tmp/inkpost-test")));
        assert_eq!(
            config.state_dir().data_dir(),
            PathBuf::from("/tmp/inkpost-test")
        );
    }

    #[test]
    fn load_leaves_validation_to_caller() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[api]\nbase_url = \"not a url\"").unwrap();

        let mut config = ClientConfig::load(Some(file.path())).unwrap();
        assert!(config.validate().is_err());

        config.api.base_url = "https://blog.example.com".into();
        config.validate().unwrap();
    }

    #[test]
    fn override_dir_layout() {
        let dir = StateDir::with_override("/srv/inkpost");
        assert_eq!(dir.data_dir(), PathBuf::from("/srv/inkpost"));
        assert_eq!(dir.config_file(), PathBuf::from("/srv/inkpost/config.toml"));
        assert_eq!(dir.log_file(), PathBuf::from("/srv/inkpost/inkpost.log"));
    }
}
