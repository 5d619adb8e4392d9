//! `stockroom-console`
//!
//! **Responsibility:** client-side session and access control for the
//! Stockroom back-office console.
//!
//! This crate provides:
//! - The session (restore, login, logout, inactivity expiry)
//! - Route gating: hard role shells plus per-route permission checks
//! - The `use_auth` / `use_permissions` handles screens consume
//!
//! The backend stays the authority; everything here only shapes what the UI
//! shows.

pub mod backend;
pub mod config;
pub mod context;
pub mod routing;
pub mod session;
pub mod watchdog;

use std::sync::Arc;

pub use backend::{AuthApi, CredentialStore, FileCredentialStore, HttpAuthApi, LoginRequest};
pub use config::{ConfigError, ConsoleConfig};
pub use context::{AuthHandle, ConsoleContext, Permissions, use_auth, use_permissions};
pub use routing::{Navigator, RouteDecision, RouteGuard};
pub use session::{LoginError, Session, SessionPhase, SessionSnapshot, SessionStatus};
pub use watchdog::{SessionWatchdog, WatchdogHandle, watch_until};

/// Wire the production collaborators described by `config` into a session.
pub fn build_session(config: &ConsoleConfig) -> Session {
    let api = Arc::new(HttpAuthApi::new(config.api_url.clone()));
    let store = Arc::new(FileCredentialStore::new(config.credentials_path.clone()));
    Session::new(api, store).with_inactivity_timeout(config.inactivity_timeout)
}
