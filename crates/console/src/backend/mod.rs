//! Collaborators the session depends on: the backend auth endpoints and the
//! local token storage. Both are traits so tests and embedders can swap them.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use stockroom_auth::StoredCredentials;

pub mod http;
pub mod store;

pub use http::HttpAuthApi;
pub use store::{FileCredentialStore, MemoryCredentialStore};

/// Username/password pair submitted by the login screen.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl LoginRequest {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl core::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Failure talking to the backend auth endpoints.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("credentials rejected")]
    Unauthorized,

    #[error("account locked")]
    Locked,

    #[error("unexpected status {0}")]
    Status(u16),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("could not decode response: {0}")]
    Decode(String),
}

/// Backend auth endpoints.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Exchange credentials for a token bundle.
    async fn login(&self, request: &LoginRequest) -> Result<StoredCredentials, ApiError>;

    /// Invalidate `access_token` on the server.
    async fn logout(&self, access_token: &str) -> Result<(), ApiError>;
}

#[derive(Debug, Error)]
pub enum CredentialStoreError {
    #[error("credential storage io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("stored credentials are corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Persisted token storage.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// `Ok(None)` when nothing has been stored.
    async fn load(&self) -> Result<Option<StoredCredentials>, CredentialStoreError>;

    async fn save(&self, credentials: &StoredCredentials) -> Result<(), CredentialStoreError>;

    /// Removing credentials that are not there is not an error.
    async fn clear(&self) -> Result<(), CredentialStoreError>;
}
