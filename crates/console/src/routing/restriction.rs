//! Hard role router restriction.
//!
//! Two roles get a reduced shell instead of the full console. For them the set
//! of reachable paths is a fixed allow-list keyed on the role itself; the
//! permission table is never consulted here, and this check runs before any
//! permission-based route protection.

use tracing::debug;

use stockroom_auth::Role;

use super::RouteDecision;
use super::path::{is_public, is_under, normalize};
use crate::session::SessionSnapshot;

/// The confined shell of a hard-restricted role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestrictedShell {
    pub role: Role,
    /// Where the role is sent when it strays.
    pub landing: &'static str,
    pub allowed: &'static [&'static str],
}

impl RestrictedShell {
    pub fn allows(&self, path: &str) -> bool {
        self.allowed.iter().any(|prefix| is_under(path, prefix))
    }
}

pub const SELLER_SHELL: RestrictedShell = RestrictedShell {
    role: Role::Seller,
    landing: "/seller",
    allowed: &["/seller"],
};

pub const TERRITORY_SELLER_SHELL: RestrictedShell = RestrictedShell {
    role: Role::SellerTt,
    landing: "/seller-tat",
    allowed: &["/seller-tat"],
};

pub static RESTRICTED_SHELLS: [RestrictedShell; 2] = [SELLER_SHELL, TERRITORY_SELLER_SHELL];

/// The shell `role` is confined to, if any.
pub fn shell_for(role: Role) -> Option<&'static RestrictedShell> {
    RESTRICTED_SHELLS.iter().find(|shell| shell.role == role)
}

/// Decide whether `path` is reachable for the current session.
///
/// Anything that is not a hard-restricted role inside an authenticated
/// session passes through untouched.
pub fn restrict(session: &SessionSnapshot, path: &str) -> RouteDecision {
    if !session.is_initialized() || !session.is_authenticated() {
        return RouteDecision::Allow;
    }

    if is_public(path) {
        return RouteDecision::Allow;
    }

    let Some(shell) = session.role().and_then(shell_for) else {
        return RouteDecision::Allow;
    };

    if shell.allows(path) {
        RouteDecision::Allow
    } else {
        debug!(role = %shell.role, path = %normalize(path), landing = shell.landing, "path outside restricted shell");
        RouteDecision::RedirectTo(shell.landing)
    }
}
