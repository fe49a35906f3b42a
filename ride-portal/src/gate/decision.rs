use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

use super::routes::{classify, RouteClass};
use super::session::SessionState;
use crate::services::ProfileStore;

pub const LOGIN_PATH: &str = "/login";
pub const DASHBOARD_PATH: &str = "/dashboard";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialReason {
    AccessDenied,
    ServerError,
}

impl DenialReason {
    pub fn code(&self) -> &'static str {
        match self {
            DenialReason::AccessDenied => "access_denied",
            DenialReason::ServerError => "server_error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginRedirect {
    /// No session: come back here after signing in.
    ReturnTo(String),
    Error(DenialReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateAction {
    Allow,
    RedirectToLogin(LoginRedirect),
    RedirectToDashboard,
    /// Sign the session out, then redirect to login with `access_denied`.
    TerminateAndRedirect,
}

impl GateAction {
    pub fn label(&self) -> &'static str {
        match self {
            GateAction::Allow => "allow",
            GateAction::RedirectToLogin(_) => "redirect_login",
            GateAction::RedirectToDashboard => "redirect_dashboard",
            GateAction::TerminateAndRedirect => "terminate",
        }
    }

    /// `Location` target, or `None` for [`GateAction::Allow`].
    pub fn location(&self) -> Option<String> {
        match self {
            GateAction::Allow => None,
            GateAction::RedirectToLogin(LoginRedirect::ReturnTo(path)) => {
                Some(login_location("returnTo", path))
            }
            GateAction::RedirectToLogin(LoginRedirect::Error(reason)) => {
                Some(login_location("error", reason.code()))
            }
            GateAction::RedirectToDashboard => Some(DASHBOARD_PATH.to_string()),
            GateAction::TerminateAndRedirect => {
                Some(login_location("error", DenialReason::AccessDenied.code()))
            }
        }
    }
}

fn login_location(key: &str, value: &str) -> String {
    match serde_urlencoded::to_string([(key, value)]) {
        Ok(query) => format!("{}?{}", LOGIN_PATH, query),
        Err(_) => LOGIN_PATH.to_string(),
    }
}

pub fn redirect_response(location: String) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}

/// Decide what happens to a request for `path` given the resolved session.
///
/// Performs at most one profile lookup, and only for protected paths whose
/// session lacks a `client` role claim. Never fails: lookup errors become a
/// `server_error` redirect.
pub async fn evaluate(
    path: &str,
    session: &SessionState,
    profiles: &dyn ProfileStore,
) -> GateAction {
    match classify(path) {
        RouteClass::Protected => evaluate_protected(path, session, profiles).await,
        RouteClass::Auth if session.is_active() => GateAction::RedirectToDashboard,
        RouteClass::Auth | RouteClass::Public => GateAction::Allow,
    }
}

async fn evaluate_protected(
    path: &str,
    session: &SessionState,
    profiles: &dyn ProfileStore,
) -> GateAction {
    let auth = match session {
        SessionState::Active(auth) => auth,
        SessionState::Absent => {
            return GateAction::RedirectToLogin(LoginRedirect::ReturnTo(path.to_string()))
        }
        SessionState::Unavailable => {
            return GateAction::RedirectToLogin(LoginRedirect::Error(DenialReason::ServerError))
        }
    };

    if auth.role.is_client() {
        return GateAction::Allow;
    }

    // Accounts created before roles were written into user metadata only
    // carry their role on the profile row.
    match profiles.fetch_profile(&auth.access_token, &auth.user_id).await {
        Ok(Some(profile)) if profile.is_client() => GateAction::Allow,
        Ok(profile) => {
            tracing::info!(
                user_id = %auth.user_id,
                claim = ?auth.role.as_deref(),
                profile_role = ?profile.as_ref().and_then(|p| p.role.as_deref()),
                "Role is not client"
            );
            GateAction::TerminateAndRedirect
        }
        Err(e) => {
            tracing::error!(user_id = %auth.user_id, error = %e, "Error fetching user profile");
            GateAction::RedirectToLogin(LoginRedirect::Error(DenialReason::ServerError))
        }
    }
}
