//! Inkpost core types and utilities

pub mod config;
pub mod error;
pub mod store;
pub mod types;
pub mod validation;

pub use config::{ApiConfig, ClientConfig, StateDir};
pub use error::{ConfigError, StoreError, StoreResult};
pub use store::{CredentialStore, FileStore, MemoryStore, StoredSession};
pub use types::{
    ContactDraft, ContactMessage, ContentKind, CredentialPair, FeedItem, FeedItemDraft, Id,
    LoginRequest, LoginResponse, MessageResponse, Post, PostDraft, RefreshRequest,
    RefreshResponse, RegisterRequest, Role, SessionState, UserProfile, UserUpdate,
};
