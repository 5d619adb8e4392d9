//! Signed-in identity.
//!
//! The backend may carry the role on the user record itself or nested under
//! `profile.role`. [`Identity::from_record`] resolves that once; nothing
//! downstream ever looks at the raw record again.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use stockroom_core::{DomainError, UserId};

use crate::Role;

/// User record as returned by the backend auth endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    pub username: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<Profile>,
    pub is_active: bool,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// Normalised identity of the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub id: UserId,
    pub username: String,
    pub email: String,
    /// Canonical role; `None` when the record names no recognised role.
    pub role: Option<Role>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdentityError {
    #[error(transparent)]
    Invalid(#[from] DomainError),

    #[error("account is inactive")]
    Inactive,
}

impl Identity {
    /// Normalise a backend record.
    ///
    /// Only structural problems are rejected here; an inactive account is still a
    /// valid identity (see [`Identity::ensure_active`]).
    pub fn from_record(record: &UserRecord) -> Result<Self, IdentityError> {
        let username = record.username.trim();
        if username.is_empty() {
            return Err(DomainError::validation("username cannot be empty").into());
        }

        let role = resolve_role(
            record.role.as_deref(),
            record.profile.as_ref().and_then(|p| p.role.as_deref()),
        );

        Ok(Self {
            id: record.id,
            username: username.to_string(),
            email: record.email.trim().to_lowercase(),
            role,
            is_active: record.is_active,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }

    pub fn ensure_active(&self) -> Result<(), IdentityError> {
        if self.is_active {
            Ok(())
        } else {
            Err(IdentityError::Inactive)
        }
    }
}

/// Pick the canonical role.
///
/// The direct field is used when it names a known role, otherwise
/// `profile.role`, otherwise none. Both set and known: direct wins.
pub fn resolve_role(direct: Option<&str>, nested: Option<&str>) -> Option<Role> {
    let mut resolved = None;
    for raw in [direct, nested].into_iter().flatten() {
        if raw.trim().is_empty() {
            continue;
        }
        match Role::parse(raw) {
            Some(role) => {
                resolved = Some(role);
                break;
            }
            None => tracing::warn!(role = raw, "unrecognised role value ignored"),
        }
    }

    if resolved.is_none() {
        tracing::debug!("no recognised role; user will hold no permissions");
    }
    resolved
}
