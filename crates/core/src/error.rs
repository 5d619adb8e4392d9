//! Errors for values entering the domain.

use thiserror::Error;

pub type DomainResult<T> = Result<T, DomainError>;

/// A value from outside (backend payload, stored file, user input) that the
/// domain refuses to accept.
///
/// Transport and storage failures have their own error types in the crates
/// that own them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("rejected value: {0}")]
    Validation(String),

    /// Unparseable identifier; the message starts with the id type's name.
    #[error("malformed id: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }
}
