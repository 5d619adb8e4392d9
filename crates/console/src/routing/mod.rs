//! Navigation gating.
//!
//! Every decision here is a pure function of a [`SessionSnapshot`] and a path.
//! Performing the navigation is left to a [`Navigator`] supplied by the routing
//! layer.
//!
//! [`SessionSnapshot`]: crate::session::SessionSnapshot

pub mod guard;
pub mod path;
pub mod restriction;

pub use guard::{RouteGuard, decide, require_login, require_permission};
pub use restriction::{RestrictedShell, restrict, shell_for};

/// What to do with a navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    /// Render the requested screen.
    Allow,
    /// Replace the current location with this path; render nothing.
    RedirectTo(&'static str),
}

impl RouteDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RouteDecision::Allow)
    }

    /// Run the next check only if this one allowed the navigation.
    pub fn and_then(self, next: impl FnOnce() -> RouteDecision) -> RouteDecision {
        match self {
            RouteDecision::Allow => next(),
            redirect => redirect,
        }
    }
}

/// Routing primitive provided by the UI shell.
pub trait Navigator {
    fn current_path(&self) -> String;

    /// Navigate without leaving a history entry, so "back" cannot return to the
    /// blocked path.
    fn replace(&self, path: &str);
}
