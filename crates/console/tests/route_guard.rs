mod support;

use std::sync::Arc;

use proptest::prelude::*;

use stockroom_auth::Role;
use stockroom_console::routing::restriction::RESTRICTED_SHELLS;
use stockroom_console::routing::{decide, require_login, shell_for};
use stockroom_console::{ConsoleContext, RouteDecision, RouteGuard, SessionSnapshot};
use support::{RecordingNavigator, identity, signed_in_as, signed_out};

fn render_at(guard: &RouteGuard, path: &str) -> (Option<&'static str>, Vec<String>) {
    let nav = RecordingNavigator::at(path);
    let rendered = guard.render(&nav, || "screen");
    (rendered, nav.replaced())
}

#[tokio::test]
async fn seller_is_sent_back_to_the_seller_shell() {
    let guard = RouteGuard::new(signed_in_as("seller").await);

    let (rendered, replaced) = render_at(&guard, "/admin/products");

    assert_eq!(rendered, None);
    assert_eq!(replaced, vec!["/seller".to_string()]);
}

#[tokio::test]
async fn seller_may_browse_inside_the_shell() {
    let guard = RouteGuard::new(signed_in_as("seller").await);

    for path in ["/seller", "/seller/cart", "/seller/orders/42?tab=lines", "/seller/"] {
        let (rendered, replaced) = render_at(&guard, path);
        assert_eq!(rendered, Some("screen"), "{path}");
        assert!(replaced.is_empty(), "{path}");
    }
}

#[tokio::test]
async fn territory_seller_is_kept_out_of_the_seller_shell() {
    let guard = RouteGuard::new(signed_in_as("seller_tt").await);

    let (rendered, replaced) = render_at(&guard, "/seller");
    assert_eq!(rendered, None);
    assert_eq!(replaced, vec!["/seller-tat".to_string()]);

    let (rendered, _) = render_at(&guard, "/seller-tat/visits");
    assert_eq!(rendered, Some("screen"));
}

#[tokio::test]
async fn prefix_match_respects_segment_boundaries() {
    let guard = RouteGuard::new(signed_in_as("seller").await);

    // "/seller-tat" starts with "/seller" but is a different shell
    assert_eq!(
        guard.decide("/seller-tat"),
        RouteDecision::RedirectTo("/seller")
    );
    assert_eq!(
        guard.decide("/sellerfoo"),
        RouteDecision::RedirectTo("/seller")
    );
}

#[tokio::test]
async fn dot_segments_do_not_leave_the_shell() {
    let guard = RouteGuard::new(signed_in_as("seller").await);

    for path in [
        "/seller/../admin/products",
        "/seller/./../admin",
        "/seller/%2e%2e/admin/products",
        "/seller//..//admin",
        "/seller\\..\\admin",
        "/login/../admin",
    ] {
        let (rendered, replaced) = render_at(&guard, path);
        assert_eq!(rendered, None, "{path}");
        assert_eq!(replaced, vec!["/seller".to_string()], "{path}");
    }

    for path in ["/seller/./cart", "/seller//cart", "/admin/../seller/cart"] {
        assert!(guard.decide(path).is_allowed(), "{path}");
    }
}

#[tokio::test]
async fn territory_seller_cannot_climb_into_the_seller_shell() {
    let guard = RouteGuard::new(signed_in_as("seller_tt").await);

    assert_eq!(
        guard.decide("/seller-tat/../seller"),
        RouteDecision::RedirectTo("/seller-tat")
    );
    assert!(guard.decide("/seller-tat/./visits").is_allowed());
}

#[tokio::test]
async fn unknown_direct_role_falls_back_to_the_profile_role() {
    let now = chrono::Utc::now();
    let clock = stockroom_core::ManualClock::new(now);
    let mut user = support::profile_record("pat", "seller", now);
    user.role = Some("user".to_string());
    let session = Arc::new(support::session(
        support::FakeApi::rejecting(stockroom_console::backend::ApiError::Unauthorized),
        support::ScriptedStore::holding(support::credentials_for(user, now)),
        &clock,
    ));
    session.initialize().await;

    assert_eq!(session.role(), Some(Role::Seller));
    assert_eq!(
        RouteGuard::new(session).decide("/admin/products"),
        RouteDecision::RedirectTo("/seller")
    );
}

#[tokio::test]
async fn manager_reaches_admin_screens() {
    let guard = RouteGuard::new(signed_in_as("manager").await);

    let (rendered, replaced) = render_at(&guard, "/admin/users");

    assert_eq!(rendered, Some("screen"));
    assert!(replaced.is_empty());
}

#[tokio::test]
async fn restricted_roles_can_still_reach_public_pages() {
    let guard = RouteGuard::new(signed_in_as("seller").await);

    for path in ["/logout", "/unauthorized", "/login", "/reset-password/abc"] {
        assert!(guard.decide(path).is_allowed(), "{path}");
    }
    // "/" is public only as an exact match
    assert_eq!(guard.decide("/"), RouteDecision::Allow);
    assert_eq!(guard.decide("/admin"), RouteDecision::RedirectTo("/seller"));
}

#[tokio::test]
async fn nothing_is_redirected_before_initialization() {
    let session = Arc::new(support::session(
        support::FakeApi::rejecting(stockroom_console::backend::ApiError::Unauthorized),
        support::ScriptedStore::holding(support::credentials(
            "pat",
            "seller",
            chrono::Utc::now(),
        )),
        &stockroom_core::ManualClock::new(chrono::Utc::now()),
    ));
    let guard = RouteGuard::new(session.clone());

    let (rendered, replaced) = render_at(&guard, "/admin/products");
    assert_eq!(rendered, Some("screen"));
    assert!(replaced.is_empty());

    session.initialize().await;
    assert_eq!(
        guard.decide("/admin/products"),
        RouteDecision::RedirectTo("/seller")
    );
}

#[tokio::test]
async fn signed_out_visitors_pass_the_guard_but_not_the_login_gate() {
    let session = signed_out().await;
    let guard = RouteGuard::new(session.clone());

    assert!(guard.decide("/admin/products").is_allowed());
    assert_eq!(
        require_login(&session.snapshot(), "/admin/products"),
        RouteDecision::RedirectTo("/login")
    );
}

#[tokio::test]
async fn permission_screens_redirect_to_unauthorized() {
    let ctx = ConsoleContext::new(signed_in_as("editor").await);
    let guard = ctx.route_guard();

    let nav = RecordingNavigator::at("/admin/users");
    assert_eq!(guard.render_with_permission(&nav, "users.view", || ()), None);
    assert_eq!(nav.replaced(), vec!["/unauthorized".to_string()]);

    let nav = RecordingNavigator::at("/admin/products");
    assert_eq!(
        guard.render_with_permission(&nav, "products.edit", || "editor"),
        Some("editor")
    );
    assert!(nav.replaced().is_empty());
}

#[tokio::test]
async fn hard_restriction_is_checked_before_permissions() {
    let guard = RouteGuard::new(signed_in_as("seller").await);

    // the seller does hold products.view, the shell still wins
    let nav = RecordingNavigator::at("/admin/products");
    assert_eq!(guard.render_with_permission(&nav, "products.view", || ()), None);
    assert_eq!(nav.replaced(), vec!["/seller".to_string()]);
}

#[tokio::test]
async fn unknown_role_is_not_confined_but_holds_nothing() {
    let ctx = ConsoleContext::new(signed_in_as("regional_director").await);

    assert_eq!(ctx.session().role(), None);
    assert!(ctx.route_guard().decide("/admin").is_allowed());

    let nav = RecordingNavigator::at("/admin/products");
    assert_eq!(
        ctx.route_guard()
            .render_with_permission(&nav, "products.view", || ()),
        None
    );
    assert_eq!(nav.replaced(), vec!["/unauthorized".to_string()]);
}

fn segment() -> impl Strategy<Value = String> {
    prop::sample::select(vec![
        "admin", "seller", "seller-tat", "sellers", "products", "cart", "users", "login",
        "unauthorized", "reports", "42", ".", "..", "%2e%2e", "",
    ])
    .prop_map(str::to_string)
}

fn path() -> impl Strategy<Value = String> {
    (prop::collection::vec(segment(), 0..4), any::<bool>()).prop_map(|(segments, trailing)| {
        let mut path = format!("/{}", segments.join("/"));
        if trailing && path.len() > 1 {
            path.push('/');
        }
        path
    })
}

fn role() -> impl Strategy<Value = Role> {
    prop::sample::select(Role::ALL.to_vec())
}

/// Independent resolution of `.` and `..` for checking the guard.
fn resolved(path: &str) -> String {
    let mut stack: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." | "%2e%2e" => {
                stack.pop();
            }
            other => stack.push(other),
        }
    }
    format!("/{}", stack.join("/"))
}

fn public(path: &str) -> bool {
    let resolved = resolved(path);
    resolved == "/"
        || ["/login", "/logout", "/forgot-password", "/reset-password", "/unauthorized"]
            .iter()
            .any(|p| resolved == *p || resolved.starts_with(&format!("{p}/")))
}

fn inside(path: &str, landing: &str) -> bool {
    let resolved = resolved(path);
    resolved == landing || resolved.starts_with(&format!("{landing}/"))
}

proptest! {
    #[test]
    fn restricted_roles_land_on_their_own_shell(role in role(), path in path()) {
        let snapshot = SessionSnapshot::signed_in(identity(Some(role)), chrono::Utc::now());
        let decision = decide(&snapshot, &path);

        match shell_for(role) {
            None => prop_assert_eq!(decision, RouteDecision::Allow),
            Some(shell) => match decision {
                RouteDecision::Allow => {
                    prop_assert!(shell.allows(&path) || public(&path));
                    prop_assert!(inside(&path, shell.landing) || public(&path));
                }
                RouteDecision::RedirectTo(to) => {
                    prop_assert_eq!(to, shell.landing);
                    prop_assert!(!shell.allows(&path));
                    prop_assert!(!inside(&path, shell.landing));
                    prop_assert!(!public(&path));
                }
            },
        }
    }

    #[test]
    fn a_redirect_target_is_never_redirected_again(role in role(), path in path()) {
        let snapshot = SessionSnapshot::signed_in(identity(Some(role)), chrono::Utc::now());
        if let RouteDecision::RedirectTo(to) = decide(&snapshot, &path) {
            prop_assert_eq!(decide(&snapshot, to), RouteDecision::Allow);
        }
    }

    #[test]
    fn no_session_means_no_redirect(path in path()) {
        prop_assert!(decide(&SessionSnapshot::uninitialized(), &path).is_allowed());
        prop_assert!(decide(&SessionSnapshot::signed_out(), &path).is_allowed());
    }
}

#[test]
fn every_restricted_shell_is_reachable_from_its_landing() {
    for shell in RESTRICTED_SHELLS.iter() {
        let snapshot = SessionSnapshot::signed_in(identity(Some(shell.role)), chrono::Utc::now());
        assert!(decide(&snapshot, shell.landing).is_allowed());
    }
}
