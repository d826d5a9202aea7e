//! Persisted credential storage
//!
//! The session client never reads tokens from ambient globals; it is handed a
//! [`CredentialStore`] and goes through it for every read and write. Two
//! implementations ship here: [`MemoryStore`] for tests and embedders, and
//! [`FileStore`], which keeps the session in a JSON file so it survives restarts.

use crate::error::{StoreError, StoreResult};
use crate::types::{CredentialPair, UserProfile};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::debug;

/// File name used by [`FileStore::in_dir`]
pub const SESSION_FILE: &str = "session.json";

#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn access_token(&self) -> StoreResult<Option<String>>;
    async fn refresh_token(&self) -> StoreResult<Option<String>>;

    /// Both tokens, or `None` unless both are present
    async fn credentials(&self) -> StoreResult<Option<CredentialPair>>;

    async fn save_credentials(&self, pair: &CredentialPair) -> StoreResult<()>;

    /// Replace only the access token, keeping the refresh token
    async fn set_access_token(&self, token: &str) -> StoreResult<()>;

    async fn profile(&self) -> StoreResult<Option<UserProfile>>;
    async fn save_profile(&self, profile: &UserProfile) -> StoreResult<()>;

    /// Drop both tokens and the cached profile. Clearing an empty store is a no-op.
    async fn clear(&self) -> StoreResult<()>;

    /// Like [`clear`](Self::clear), but remember that a session ended
    /// without the user logging out. Saving new credentials forgets it.
    async fn mark_expired(&self) -> StoreResult<()>;

    async fn is_expired(&self) -> StoreResult<bool>;
}

/// Everything a store persists
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(
        default,
        rename = "refreshToken",
        skip_serializing_if = "Option::is_none"
    )]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserProfile>,
    /// Set when credentials were dropped because the session could not be renewed
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub expired: bool,
}

impl StoredSession {
    fn pair(&self) -> Option<CredentialPair> {
        match (&self.token, &self.refresh_token) {
            (Some(access), Some(refresh)) => Some(CredentialPair::new(access, refresh)),
            _ => None,
        }
    }

    /// What is left after an unrecoverable session failure
    pub fn ended() -> Self {
        Self {
            expired: true,
            ..Self::default()
        }
    }

    fn is_empty(&self) -> bool {
        self.token.is_none()
            && self.refresh_token.is_none()
            && self.user.is_none()
            && !self.expired
    }
}

/// In-process store
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<StoredSession>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a credential pair already stored
    pub fn with_credentials(pair: CredentialPair) -> Self {
        Self {
            inner: RwLock::new(StoredSession {
                token: Some(pair.access_token),
                refresh_token: Some(pair.refresh_token),
                ..StoredSession::default()
            }),
        }
    }

    /// Start from an arbitrary snapshot, including half-populated ones
    pub fn from_session(session: StoredSession) -> Self {
        Self {
            inner: RwLock::new(session),
        }
    }

    pub async fn snapshot(&self) -> StoredSession {
        self.inner.read().await.clone()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn access_token(&self) -> StoreResult<Option<String>> {
        Ok(self.inner.read().await.token.clone())
    }

    async fn refresh_token(&self) -> StoreResult<Option<String>> {
        Ok(self.inner.read().await.refresh_token.clone())
    }

    async fn credentials(&self) -> StoreResult<Option<CredentialPair>> {
        Ok(self.inner.read().await.pair())
    }

    async fn save_credentials(&self, pair: &CredentialPair) -> StoreResult<()> {
        let mut guard = self.inner.write().await;
        guard.token = Some(pair.access_token.clone());
        guard.refresh_token = Some(pair.refresh_token.clone());
        guard.expired = false;
        Ok(())
    }

    async fn set_access_token(&self, token: &str) -> StoreResult<()> {
        self.inner.write().await.token = Some(token.to_string());
        Ok(())
    }

    async fn profile(&self) -> StoreResult<Option<UserProfile>> {
        Ok(self.inner.read().await.user.clone())
    }

    async fn save_profile(&self, profile: &UserProfile) -> StoreResult<()> {
        self.inner.write().await.user = Some(profile.clone());
        Ok(())
    }

    async fn clear(&self) -> StoreResult<()> {
        *self.inner.write().await = StoredSession::default();
        Ok(())
    }

    async fn mark_expired(&self) -> StoreResult<()> {
        *self.inner.write().await = StoredSession::ended();
        Ok(())
    }

    async fn is_expired(&self) -> StoreResult<bool> {
        Ok(self.inner.read().await.expired)
    }
}

/// Store backed by a JSON file
///
/// Reads always go to disk so that several processes sharing the file see each
/// other's refreshes. Writes within this process are serialized by a lock.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    lock: RwLock<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: RwLock::new(()),
        }
    }

    /// Store at `<dir>/session.json`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(SESSION_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> StoreResult<StoredSession> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Ok(StoredSession::default()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Ok(StoredSession::default())
            }
            Err(err) => Err(StoreError::io(&self.path, err)),
        }
    }

    async fn write(&self, session: &StoredSession) -> StoreResult<()> {
        if session.is_empty() {
            return match tokio::fs::remove_file(&self.path).await {
                Ok(()) => Ok(()),
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(err) => Err(StoreError::io(&self.path, err)),
            };
        }

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::io(parent, e))?;
        }

        // Write to a sibling file first so readers never see a torn session.
        let tmp = self.path.with_extension("json.tmp");
        let content = serde_json::to_vec_pretty(session)?;
        tokio::fs::write(&tmp, content)
            .await
            .map_err(|e| StoreError::io(&tmp, e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| StoreError::io(&self.path, e))?;
        debug!(path = %self.path.display(), "Session file written");
        Ok(())
    }

    async fn update<F>(&self, f: F) -> StoreResult<()>
    where
        F: FnOnce(&mut StoredSession) + Send,
    {
        let _guard = self.lock.write().await;
        let mut session = self.read().await?;
        f(&mut session);
        self.write(&session).await
    }
}

#[async_trait]
impl CredentialStore for FileStore {
    async fn access_token(&self) -> StoreResult<Option<String>> {
        let _guard = self.lock.read().await;
        Ok(self.read().await?.token)
    }

    async fn refresh_token(&self) -> StoreResult<Option<String>> {
        let _guard = self.lock.read().await;
        Ok(self.read().await?.refresh_token)
    }

    async fn credentials(&self) -> StoreResult<Option<CredentialPair>> {
        let _guard = self.lock.read().await;
        Ok(self.read().await?.pair())
    }

    async fn save_credentials(&self, pair: &CredentialPair) -> StoreResult<()> {
        let pair = pair.clone();
        self.update(move |s| {
            s.token = Some(pair.access_token);
            s.refresh_token = Some(pair.refresh_token);
            s.expired = false;
        })
        .await
    }

    async fn set_access_token(&self, token: &str) -> StoreResult<()> {
        let token = token.to_string();
        self.update(move |s| s.token = Some(token)).await
    }

    async fn profile(&self) -> StoreResult<Option<UserProfile>> {
        let _guard = self.lock.read().await;
        Ok(self.read().await?.user)
    }

    async fn save_profile(&self, profile: &UserProfile) -> StoreResult<()> {
        let profile = profile.clone();
        self.update(move |s| s.user = Some(profile)).await
    }

    async fn clear(&self) -> StoreResult<()> {
        let _guard = self.lock.write().await;
        self.write(&StoredSession::default()).await
    }

    async fn mark_expired(&self) -> StoreResult<()> {
        let _guard = self.lock.write().await;
        self.write(&StoredSession::ended()).await
    }

    async fn is_expired(&self) -> StoreResult<bool> {
        let _guard = self.lock.read().await;
        Ok(self.read().await?.expired)
    }
}
