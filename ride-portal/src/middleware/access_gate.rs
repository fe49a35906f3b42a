use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use tower_sessions::Session;

use crate::gate::{self, decision::redirect_response, GateAction, SessionState};
use crate::services::{metrics, AuthGateway};
use crate::AppState;

/// Route guard for the dashboard and the auth pages.
///
/// Always answers: either the wrapped handler's response or a redirect. The
/// session layer sits outside this middleware, so a refreshed session cookie
/// is attached to whichever response goes out.
pub async fn access_gate(
    State(state): State<AppState>,
    session: Session,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_owned();
    if !gate::is_gated(&path) {
        return next.run(request).await;
    }

    let resolved = gate::resolve_session(
        &session,
        state.auth.as_ref(),
        state.gate.refresh_margin_secs,
        Utc::now().timestamp(),
    )
    .await;
    tracing::debug!(path = %path, has_session = resolved.is_active(), "Session check");

    let action = gate::evaluate(&path, &resolved, state.profiles.as_ref()).await;
    metrics::record_gate_decision(action.label());

    match action {
        GateAction::Allow => {
            tracing::info!(path = %path, action = action.label(), "Access gate decision");
            if let SessionState::Active(auth) = resolved {
                request.extensions_mut().insert(auth);
            }
            next.run(request).await
        }
        GateAction::TerminateAndRedirect => {
            tracing::info!(path = %path, "Signing out session without client role");
            terminate_session(&session, state.auth.as_ref(), &resolved).await;
            redirect(&action, &path)
        }
        GateAction::RedirectToLogin(_) | GateAction::RedirectToDashboard => {
            redirect(&action, &path)
        }
    }
}

/// Revoke the session at the backend, then drop the local record. A failed
/// revocation is logged and does not stop the local sign-out.
async fn terminate_session(session: &Session, auth: &dyn AuthGateway, resolved: &SessionState) {
    if let SessionState::Active(stored) = resolved {
        if let Err(e) = auth.sign_out(&stored.access_token).await {
            tracing::warn!(user_id = %stored.user_id, error = %e, "Backend sign-out failed");
        }
    }
    if let Err(e) = session.flush().await {
        tracing::warn!(error = %e, "Failed to clear local session");
    }
}

fn redirect(action: &GateAction, path: &str) -> Response {
    let location = action.location().unwrap_or_else(|| "/login".to_string());
    tracing::info!(path = %path, action = action.label(), location = %location, "Access gate redirect");
    redirect_response(location)
}
