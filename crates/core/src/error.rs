//! Error types shared by the core crate

/// Standard result type for credential store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Failures reading or writing persisted session data
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO operation failed on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Stored session is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

impl StoreError {
    /// Create an IO error tagged with the file it happened on
    pub fn io(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }
}

/// Client configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error(transparent)]
    Source(#[from] config::ConfigError),
}

impl ConfigError {
    /// Create an invalid config error
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }
}
