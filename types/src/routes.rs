//! Route guard decisions.
//!
//! [`evaluate`] is a pure function of the current path, the authenticated
//! role (if any), and whether auth state is still loading. It is evaluated
//! on every navigation and on every auth-state change; it never stores
//! anything.

use crate::Role;

/// Paths reachable without authentication. The home path is always public
/// regardless of auth state.
pub const PUBLIC_PATHS: &[&str] = &["/", "/login", "/register", "/pricing", "/maintenance"];

/// Pages that only make sense for unauthenticated visitors.
const AUTH_ONLY_PATHS: &[&str] = &["/login", "/register"];

/// Outcome of a guard evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Auth state is still loading; decide nothing yet.
    Wait,
    /// The current path is allowed.
    Allow,
    /// Navigate to the given path instead.
    Redirect(&'static str),
}

#[must_use]
pub fn is_public(path: &str) -> bool {
    PUBLIC_PATHS.contains(&path)
}

fn is_auth_only(path: &str) -> bool {
    AUTH_ONLY_PATHS.contains(&path)
}

fn in_namespace(path: &str, namespace: &str) -> bool {
    path == namespace
        || path
            .strip_prefix(namespace)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Decide whether the current navigation state is allowed.
///
/// Decision order:
/// 1. Auth still loading: [`GuardDecision::Wait`].
/// 2. No user and a non-public path: redirect to `/login`.
/// 3. Authenticated user on `/login` or `/register`: redirect to the role's
///    own dashboard.
/// 4. Authenticated user inside another role's namespace: redirect to the
///    role's own dashboard.
/// 5. Otherwise: [`GuardDecision::Allow`].
#[must_use]
pub fn evaluate(path: &str, role: Option<Role>, auth_loading: bool) -> GuardDecision {
    if auth_loading {
        return GuardDecision::Wait;
    }

    let Some(role) = role else {
        if is_public(path) {
            return GuardDecision::Allow;
        }
        return GuardDecision::Redirect("/login");
    };

    if is_auth_only(path) {
        return GuardDecision::Redirect(role.dashboard_path());
    }

    // A path inside a role namespace must belong to the user's own role.
    for other in [Role::Seller, Role::Admin] {
        if in_namespace(path, other.namespace()) && other.namespace() != role.namespace() {
            return GuardDecision::Redirect(role.dashboard_path());
        }
    }

    GuardDecision::Allow
}
