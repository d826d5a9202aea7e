//! Inkpost HTTP clients
//!
//! Typed access to the blog API: public pages, the author dashboard and the
//! admin panel. Authenticated calls go through [`SessionClient`], which
//! refreshes an expired access token once and retries before giving up.

pub mod client;

pub use client::{ClientBuilder, ClientError, PendingRequest, PublicClient, SessionClient};
