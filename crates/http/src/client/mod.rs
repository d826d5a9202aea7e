//! Inkpost HTTP clients
//!
//! [`PublicClient`] talks to endpoints that need no credentials (login, the
//! public blog pages, the contact form). [`SessionClient`] wraps it for
//! everything behind a bearer token and owns the refresh-and-retry contract.

pub mod admin;
pub mod auth;
pub mod content;
pub mod error;
pub mod public;
pub mod session;

pub use error::ClientError;
pub use public::PublicClient;
pub use session::{PendingRequest, SessionClient};

use inkpost_core::{ApiConfig, CredentialStore, Id};
use reqwest::StatusCode;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use std::time::Duration;

/// Applied when the builder is given no explicit timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const DEFAULT_USER_AGENT: &str = concat!("inkpost/", env!("CARGO_PKG_VERSION"));

/// Builder for both client flavours
#[derive(Debug, Default)]
pub struct ClientBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl ClientBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder preloaded from configuration
    pub fn from_config(config: &ApiConfig) -> Self {
        Self::new()
            .base_url(&config.base_url)
            .timeout(config.timeout())
            .user_agent(&config.user_agent)
    }

    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the request timeout
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Build a public client
    pub fn build_public(self) -> Result<PublicClient, ClientError> {
        let base_url = self
            .base_url
            .ok_or_else(|| ClientError::Configuration("base_url is required".into()))?;

        // Ensure base_url ends without a trailing slash
        let base_url = base_url.trim_end_matches('/').to_string();
        url::Url::parse(&base_url)
            .map_err(|e| ClientError::Configuration(format!("invalid base_url: {e}")))?;

        let client = reqwest::ClientBuilder::new()
            .timeout(self.timeout.unwrap_or(DEFAULT_TIMEOUT))
            .user_agent(
                self.user_agent
                    .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            )
            .build()?;

        Ok(PublicClient::from_parts(client, base_url))
    }

    /// Build a session client reading and writing credentials through `store`
    pub fn build_session(
        self,
        store: Arc<dyn CredentialStore>,
    ) -> Result<SessionClient, ClientError> {
        Ok(SessionClient::new(self.build_public()?, store))
    }
}

/// Append query pairs to a path, skipping empty values
pub(crate) fn with_query(path: &str, pairs: &[(&str, Option<&str>)]) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    let mut any = false;
    for (key, value) in pairs {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            serializer.append_pair(key, value);
            any = true;
        }
    }

    if any {
        format!("{path}?{}", serializer.finish())
    } else {
        path.to_string()
    }
}

/// `<collection>/<id>`, with the id encoded as a single path segment
pub(crate) fn item_path(collection: &str, id: &Id) -> String {
    let segment = url::form_urlencoded::byte_serialize(id.to_string().as_bytes())
        .collect::<String>()
        .replace('+', "%20");
    format!("{collection}/{segment}")
}

/// Decode the body of a 2xx response. An empty body reads as `null`.
pub(crate) fn parse_success_body(status: StatusCode, body: &str) -> Result<JsonValue, ClientError> {
    if body.trim().is_empty() {
        return Ok(JsonValue::Null);
    }
    serde_json::from_str(body).map_err(|e| {
        ClientError::request_failed(Some(status.as_u16()), format!("Invalid JSON in response: {e}"))
    })
}
