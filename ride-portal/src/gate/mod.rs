//! Access gate: per-request allow / redirect / sign-out decisions for the
//! dashboard and the auth pages.
//!
//! [`session::resolve_session`] turns the cookie-backed session into a
//! [`SessionState`], [`decision::evaluate`] maps path and session state to a
//! [`GateAction`]. The axum wiring lives in
//! [`crate::middleware::access_gate`].

pub mod decision;
pub mod routes;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

pub use decision::{evaluate, DenialReason, GateAction, LoginRedirect};
pub use routes::{classify, is_gated, RouteClass};
pub use session::{resolve_session, SessionState};
