//! Route guard: the check every navigation passes through.

use std::sync::Arc;

use tracing::debug;

use stockroom_auth::{can_access, explain_access};

use super::path::{LOGIN_PATH, UNAUTHORIZED_PATH, is_public, normalize};
use super::{Navigator, RouteDecision, restrict};
use crate::session::{Session, SessionSnapshot};

/// Compose the session state with the hard role restriction.
///
/// In order:
/// 1. session not initialized yet: allow (the screen shows its own loading state)
/// 2. nobody signed in: allow (login is enforced by [`require_login`])
/// 3. hard role restriction: its redirect is final
/// 4. allow; the screen may add a [`require_permission`] check of its own
pub fn decide(session: &SessionSnapshot, path: &str) -> RouteDecision {
    if !session.is_initialized() {
        return RouteDecision::Allow;
    }
    if !session.is_authenticated() {
        return RouteDecision::Allow;
    }
    restrict(session, path)
}

/// Per-route permission check, layered under [`decide`].
///
/// Defers to the session gates while nobody is known to be signed in.
pub fn require_permission(session: &SessionSnapshot, permission: &str) -> RouteDecision {
    if !session.is_authenticated() {
        return RouteDecision::Allow;
    }
    if can_access(permission, session.role()) {
        RouteDecision::Allow
    } else {
        let why = explain_access(permission, session.role());
        debug!(permission, reason = %why.reason, "route permission denied");
        RouteDecision::RedirectTo(UNAUTHORIZED_PATH)
    }
}

/// The "must be signed in" gate for non-public screens.
///
/// Waits for initialization before sending anyone to the login page.
pub fn require_login(session: &SessionSnapshot, path: &str) -> RouteDecision {
    if session.is_initialized() && !session.is_authenticated() && !is_public(path) {
        RouteDecision::RedirectTo(LOGIN_PATH)
    } else {
        RouteDecision::Allow
    }
}

/// Wraps every screen. Reads the session, decides, and either renders the
/// children or performs a replace-navigation.
#[derive(Debug, Clone)]
pub struct RouteGuard {
    session: Arc<Session>,
}

impl RouteGuard {
    pub fn new(session: Arc<Session>) -> Self {
        Self { session }
    }

    pub fn decide(&self, path: &str) -> RouteDecision {
        decide(&self.session.snapshot(), path)
    }

    /// Render `children` if the current path may be shown.
    pub fn render<N, V>(&self, navigator: &N, children: impl FnOnce() -> V) -> Option<V>
    where
        N: Navigator + ?Sized,
    {
        let path = navigator.current_path();
        let decision = self.decide(&path);
        follow(decision, navigator, &path).then(children)
    }

    /// [`RouteGuard::render`] for a screen that also requires `permission`.
    ///
    /// Both checks see the same snapshot.
    pub fn render_with_permission<N, V>(
        &self,
        navigator: &N,
        permission: &str,
        children: impl FnOnce() -> V,
    ) -> Option<V>
    where
        N: Navigator + ?Sized,
    {
        let snapshot = self.session.snapshot();
        let path = navigator.current_path();
        let decision =
            decide(&snapshot, &path).and_then(|| require_permission(&snapshot, permission));
        follow(decision, navigator, &path).then(children)
    }
}

fn follow<N: Navigator + ?Sized>(decision: RouteDecision, navigator: &N, path: &str) -> bool {
    match decision {
        RouteDecision::Allow => true,
        RouteDecision::RedirectTo(to) => {
            debug!(from = %normalize(path), to, "route redirected");
            navigator.replace(to);
            false
        }
    }
}
