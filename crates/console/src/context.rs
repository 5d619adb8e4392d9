//! Handles consumed by feature screens.
//!
//! Screens never reach for a global: the composition root builds one
//! [`ConsoleContext`] and passes it down. `use_auth` and `use_permissions`
//! are the only ways in.

use std::sync::Arc;

use tracing::debug;

use stockroom_auth::{Identity, Role, can_access, explain_access};

use crate::backend::LoginRequest;
use crate::routing::RouteGuard;
use crate::session::{LoginError, Session, SessionStatus};

#[derive(Debug, Clone)]
pub struct ConsoleContext {
    session: Arc<Session>,
}

impl ConsoleContext {
    pub fn new(session: Arc<Session>) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// The guard every screen is nested inside.
    pub fn route_guard(&self) -> RouteGuard {
        RouteGuard::new(self.session.clone())
    }
}

pub fn use_auth(ctx: &ConsoleContext) -> AuthHandle<'_> {
    AuthHandle {
        session: &ctx.session,
    }
}

pub fn use_permissions(ctx: &ConsoleContext) -> Permissions {
    Permissions {
        role: ctx.session.role(),
    }
}

/// Identity and sign-in/out for screens.
///
/// Only [`AuthHandle::login`] can fail; everything else settles into state.
#[derive(Debug, Clone, Copy)]
pub struct AuthHandle<'a> {
    session: &'a Session,
}

impl AuthHandle<'_> {
    pub fn user(&self) -> Option<Identity> {
        self.session.user()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    pub fn is_initialized(&self) -> bool {
        self.session.is_initialized()
    }

    pub async fn initialize(&self) {
        self.session.initialize().await
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<Identity, LoginError> {
        self.session.login(request).await
    }

    pub async fn logout(&self) {
        self.session.logout().await
    }

    pub fn update_activity(&self) {
        self.session.update_activity()
    }

    pub async fn check_session(&self) -> SessionStatus {
        self.session.check_session().await
    }
}

/// Action gating for the current user, captured when the handle is taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Permissions {
    role: Option<Role>,
}

impl Permissions {
    pub fn role(&self) -> Option<Role> {
        self.role
    }

    pub fn can_access(&self, permission: &str) -> bool {
        let granted = can_access(permission, self.role);
        if !granted {
            debug!(permission, reason = %explain_access(permission, self.role).reason, "action hidden");
        }
        granted
    }

    /// `true` if any of `permissions` is held (e.g. to show an "Actions" column).
    pub fn can_access_any(&self, permissions: &[&str]) -> bool {
        permissions.iter().any(|p| can_access(p, self.role))
    }
}
