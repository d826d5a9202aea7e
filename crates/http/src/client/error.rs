//! Client error types

use inkpost_core::StoreError;
use serde::Deserialize;
use thiserror::Error;

/// Error string the API pairs with a 401 when the access token can be refreshed
pub const TOKEN_EXPIRED: &str = "Token expired";

/// Message used when a failed response carries no usable error text
pub const GENERIC_FAILURE: &str = "Request failed";

/// Client error types
#[derive(Debug, Error)]
pub enum ClientError {
    /// Credentials are gone: refresh was impossible or failed. The caller
    /// should send the user back to the login view.
    #[error("Session expired. Please log in again.")]
    SessionExpired,

    /// Server answered with a non-2xx status unrelated to session expiry
    #[error("{message}")]
    RequestFailed {
        status: Option<u16>,
        message: String,
    },

    /// No response was obtained at all (connect failure, timeout, reset)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The credential store could not be read or written
    #[error("Credential store error: {0}")]
    Store(#[from] StoreError),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

impl ClientError {
    pub fn request_failed(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::RequestFailed {
            status,
            message: message.into(),
        }
    }

    pub const fn is_session_expired(&self) -> bool {
        matches!(self, Self::SessionExpired)
    }

    pub const fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    /// HTTP status of a failed request, when there was one
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::RequestFailed { status, .. } => *status,
            _ => None,
        }
    }

    /// Text a view should show for this error
    pub fn user_message(&self) -> String {
        match self {
            Self::SessionExpired => "Session expired. Please log in again.".to_string(),
            Self::RequestFailed { message, .. } => message.clone(),
            Self::Network(err) if err.is_timeout() => {
                "The server took too long to respond. Please try again.".to_string()
            }
            Self::Network(_) => {
                "Unable to reach the server. Please check your connection or try again later."
                    .to_string()
            }
            Self::Store(_) | Self::Serialization(_) | Self::Configuration(_) => {
                "An unexpected error occurred. Please try again.".to_string()
            }
        }
    }
}

/// Error body shapes the API uses: `{error}` or `{errors: [...]}`
#[derive(Debug, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub errors: Option<Vec<String>>,
}

impl ApiErrorBody {
    /// Parse an error body, tolerating non-JSON payloads
    pub fn parse(body: &str) -> Self {
        serde_json::from_str(body).unwrap_or_default()
    }

    pub fn is_token_expired(&self) -> bool {
        self.error.as_deref() == Some(TOKEN_EXPIRED)
    }

    /// Server-supplied message, if any
    pub fn message(&self) -> Option<String> {
        if let Some(error) = self.error.as_deref().filter(|e| !e.is_empty()) {
            return Some(error.to_string());
        }
        self.errors
            .as_ref()
            .filter(|errors| !errors.is_empty())
            .map(|errors| errors.join(", "))
    }

    pub fn message_or_generic(&self) -> String {
        self.message().unwrap_or_else(|| GENERIC_FAILURE.to_string())
    }
}
