use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::UserRecord;

/// Token bundle handed out by a successful login and persisted between runs.
///
/// Signature verification is the backend's job; the client only checks the
/// time window before trusting a restored bundle.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCredentials {
    pub access_token: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,

    pub user: UserRecord,
}

impl core::fmt::Debug for StoredCredentials {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("StoredCredentials")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .field("user", &self.user.id)
            .finish()
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CredentialError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (expires_at <= issued_at)")]
    InvalidTimeWindow,

    #[error("access token is empty")]
    MissingToken,
}

impl StoredCredentials {
    /// Deterministically validate the bundle against `now`.
    pub fn validate(&self, now: DateTime<Utc>) -> Result<(), CredentialError> {
        if self.access_token.trim().is_empty() {
            return Err(CredentialError::MissingToken);
        }
        if self.expires_at <= self.issued_at {
            return Err(CredentialError::InvalidTimeWindow);
        }
        if now < self.issued_at {
            return Err(CredentialError::NotYetValid);
        }
        if now >= self.expires_at {
            return Err(CredentialError::Expired);
        }
        Ok(())
    }
}
