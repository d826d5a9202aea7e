//! Authenticated requests with one-shot token refresh
//!
//! Every protected view goes through [`SessionClient::request`]. One logical
//! call moves through these states and never carries state into the next call:
//!
//! ```text
//! ISSUE -> 2xx                      -> DONE
//! ISSUE -> 401 "Token expired"      -> REFRESH -> ok     -> RETRY -> DONE | RequestFailed
//!                                   -> REFRESH -> failed -> SessionExpired
//! ISSUE -> 401 otherwise            -> SessionExpired
//! ISSUE -> other non-2xx            -> RequestFailed
//! ISSUE -> transport failure        -> Network
//! ```
//!
//! The retry is never refreshed again, so a server that keeps rejecting fresh
//! tokens cannot push a caller into a loop. Only the `SessionExpired` outcome
//! clears the credential store.
//!
//! Refreshes are serialized on an async mutex. A caller that waited behind
//! another caller's refresh finds a different access token in the store and
//! retries with it instead of refreshing a second time.

use super::error::{ApiErrorBody, TOKEN_EXPIRED};
use super::{ClientError, PublicClient, parse_success_body};
use inkpost_core::{CredentialStore, SessionState};
use reqwest::{Method, StatusCode, header};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// One in-flight call. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingRequest {
    pub method: Method,
    /// Path relative to the API base, including any query string
    pub path: String,
    /// JSON payload; its presence marks the request as carrying content
    pub body: Option<JsonValue>,
}

impl PendingRequest {
    pub fn new(method: Method, path: impl Into<String>, body: Option<JsonValue>) -> Self {
        Self {
            method,
            path: path.into(),
            body,
        }
    }
}

/// How the server answered a single attempt
enum Reply {
    Done(JsonValue),
    Expired,
    Unauthorized(String),
    Failed { status: u16, message: String },
}

/// Performs authorized calls on behalf of the views
///
/// Share one instance (behind an `Arc`) between all concurrent callers; the
/// credential store is the only mutable state they have in common.
pub struct SessionClient {
    public: PublicClient,
    store: Arc<dyn CredentialStore>,
    refresh_lock: Mutex<()>,
}

impl fmt::Debug for SessionClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionClient")
            .field("base_url", &self.public.base_url())
            .finish_non_exhaustive()
    }
}

impl SessionClient {
    pub fn new(public: PublicClient, store: Arc<dyn CredentialStore>) -> Self {
        Self {
            public,
            store,
            refresh_lock: Mutex::new(()),
        }
    }

    /// The unauthenticated client this one is built on
    pub const fn public(&self) -> &PublicClient {
        &self.public
    }

    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    pub fn base_url(&self) -> &str {
        self.public.base_url()
    }

    /// Current session state, derived from the store
    ///
    /// The expiry marker lives in the store, so a persistent store reports
    /// `Expired` to later processes too.
    pub async fn state(&self) -> Result<SessionState, ClientError> {
        if self.store.access_token().await?.is_some() {
            return Ok(SessionState::Authenticated);
        }
        if self.store.is_expired().await? {
            Ok(SessionState::Expired)
        } else {
            Ok(SessionState::Anonymous)
        }
    }

    /// Perform one authorized call
    ///
    /// Attaches the stored access token when there is one, refreshes it at most
    /// once if the server reports it expired, and returns the parsed JSON body
    /// of a 2xx response (`null` for an empty body).
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<JsonValue>,
    ) -> Result<JsonValue, ClientError> {
        let pending = PendingRequest::new(method, path, body);
        self.run(&pending).await
    }

    /// `GET` a path and return the raw JSON
    pub async fn get(&self, path: &str) -> Result<JsonValue, ClientError> {
        self.request(Method::GET, path, None).await
    }

    /// `GET` a path and decode the JSON into `T`
    pub async fn get_as<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let value = self.get(path).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Send `body` and decode the JSON reply into `T`
    pub async fn send_as<T, B>(&self, method: Method, path: &str, body: &B) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = serde_json::to_value(body)?;
        let value = self.request(method, path, Some(body)).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Issue a call that expects no meaningful reply body
    pub async fn send_unit(&self, method: Method, path: &str) -> Result<(), ClientError> {
        self.request(method, path, None).await.map(|_| ())
    }

    /// Drive one logical call through issue, refresh and retry
    pub async fn run(&self, pending: &PendingRequest) -> Result<JsonValue, ClientError> {
        let token = self.store.access_token().await?;

        match self.attempt(pending, token.as_deref()).await? {
            Reply::Done(value) => Ok(value),
            Reply::Failed { status, message } => {
                Err(ClientError::request_failed(Some(status), message))
            }
            Reply::Unauthorized(message) => {
                debug!(path = %pending.path, %message, "Request unauthorized");
                Err(self.expire(token.is_some()).await)
            }
            Reply::Expired => {
                let fresh = self.refresh_access_token(token.as_deref()).await?;
                debug!(method = %pending.method, path = %pending.path, "Retrying with refreshed token");

                match self.attempt(pending, Some(&fresh)).await? {
                    Reply::Done(value) => Ok(value),
                    Reply::Expired => Err(ClientError::request_failed(
                        Some(StatusCode::UNAUTHORIZED.as_u16()),
                        TOKEN_EXPIRED,
                    )),
                    Reply::Unauthorized(message) => Err(ClientError::request_failed(
                        Some(StatusCode::UNAUTHORIZED.as_u16()),
                        message,
                    )),
                    Reply::Failed { status, message } => {
                        Err(ClientError::request_failed(Some(status), message))
                    }
                }
            }
        }
    }

    /// Send once with the given token and classify the answer
    async fn attempt(
        &self,
        pending: &PendingRequest,
        token: Option<&str>,
    ) -> Result<Reply, ClientError> {
        let mut request = self.public.request(pending.method.clone(), &pending.path);
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        if let Some(body) = &pending.body {
            request = request.json(body);
        }

        debug!(method = %pending.method, path = %pending.path, authorized = token.is_some(), "Issuing request");
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        debug!(method = %pending.method, path = %pending.path, status = status.as_u16(), "Response received");

        if status.is_success() {
            return parse_success_body(status, &body).map(Reply::Done);
        }

        let error = ApiErrorBody::parse(&body);
        if status == StatusCode::UNAUTHORIZED {
            if error.is_token_expired() {
                return Ok(Reply::Expired);
            }
            return Ok(Reply::Unauthorized(error.message_or_generic()));
        }

        Ok(Reply::Failed {
            status: status.as_u16(),
            message: error.message_or_generic(),
        })
    }

    /// Obtain a usable access token after `stale` was reported expired
    async fn refresh_access_token(&self, stale: Option<&str>) -> Result<String, ClientError> {
        let _guard = self.refresh_lock.lock().await;

        if let Some(current) = self.store.access_token().await? {
            if stale != Some(current.as_str()) {
                debug!("Access token was refreshed by a concurrent call");
                return Ok(current);
            }
        }

        let Some(refresh_token) = self.store.refresh_token().await? else {
            debug!("No refresh token stored");
            return Err(self.expire(true).await);
        };

        match self.public.refresh(&refresh_token).await {
            Ok(token) => {
                self.store.set_access_token(&token).await?;
                info!("Access token refreshed");
                Ok(token)
            }
            Err(err) => {
                warn!(error = %err, "Token refresh failed");
                Err(self.expire(true).await)
            }
        }
    }

    /// Drop all stored credentials and produce the terminal error
    async fn expire(&self, had_session: bool) -> ClientError {
        let cleared = if had_session {
            self.store.mark_expired().await
        } else {
            self.store.clear().await
        };

        match cleared {
            Ok(()) if had_session => warn!("Session expired, stored credentials cleared"),
            Ok(()) => {}
            Err(err) => error!(error = %err, "Failed to clear stored credentials"),
        }

        ClientError::SessionExpired
    }
}
