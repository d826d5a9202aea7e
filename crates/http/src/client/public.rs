//! Client for endpoints that need no credentials

use super::error::ApiErrorBody;
use super::{ClientBuilder, ClientError, parse_success_body};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use tracing::debug;

/// Client for public endpoints that don't require authentication
///
/// Failures are reported as [`ClientError::RequestFailed`] whatever the status,
/// so a rejected login is never confused with an expired session.
#[derive(Clone, Debug)]
pub struct PublicClient {
    client: Client,
    base_url: String,
}

impl PublicClient {
    /// Create a new public client with default settings
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        ClientBuilder::new().base_url(base_url).build_public()
    }

    pub(crate) const fn from_parts(client: Client, base_url: String) -> Self {
        Self { client, base_url }
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an API path
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Create a request builder without authentication
    pub fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.client.request(method, self.url(path))
    }

    /// Execute a request and decode the JSON body
    pub async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ClientError> {
        let value = self.execute_value(request).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Execute a request and return the raw JSON body
    pub async fn execute_value(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<JsonValue, ClientError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        debug!(status = status.as_u16(), "Public request completed");

        if status.is_success() {
            parse_success_body(status, &body)
        } else {
            Err(ClientError::request_failed(
                Some(status.as_u16()),
                ApiErrorBody::parse(&body).message_or_generic(),
            ))
        }
    }
}
