use tower_sessions::Session;

use crate::models::AuthSession;
use crate::services::AuthGateway;

/// What the gate knows about the caller after looking at the session store.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Active(AuthSession),
    Absent,
    /// The session store itself could not be read.
    Unavailable,
}

impl SessionState {
    pub fn is_active(&self) -> bool {
        matches!(self, SessionState::Active(_))
    }
}

/// Load the caller's session, refreshing it first when it is within
/// `refresh_margin_secs` of expiry.
///
/// A refreshed session is written back so the session layer re-issues the
/// cookie. A refresh the backend rejects drops the stored record; a refresh
/// that fails in transit leaves it in place for the next request. Either way
/// this request proceeds without a session.
pub async fn resolve_session(
    session: &Session,
    auth: &dyn AuthGateway,
    refresh_margin_secs: i64,
    now: i64,
) -> SessionState {
    let stored = match session.get::<AuthSession>(AuthSession::KEY).await {
        Ok(Some(stored)) => stored,
        Ok(None) => return SessionState::Absent,
        Err(e) => {
            tracing::error!(error = %e, "Failed to read session store");
            return SessionState::Unavailable;
        }
    };

    if !stored.needs_refresh(now, refresh_margin_secs) {
        return SessionState::Active(stored);
    }

    match auth.refresh_session(&stored.refresh_token).await {
        Ok(grant) => {
            let refreshed = AuthSession::from_grant(grant, now);
            if let Err(e) = session.insert(AuthSession::KEY, &refreshed).await {
                tracing::warn!(
                    user_id = %refreshed.user_id,
                    error = %e,
                    "Failed to persist refreshed session"
                );
            } else {
                tracing::debug!(user_id = %refreshed.user_id, "Session refreshed");
            }
            SessionState::Active(refreshed)
        }
        Err(e) if e.is_rejection() => {
            tracing::info!(user_id = %stored.user_id, error = %e, "Session refresh rejected");
            if let Err(e) = session.remove::<AuthSession>(AuthSession::KEY).await {
                tracing::warn!(error = %e, "Failed to drop rejected session");
            }
            SessionState::Absent
        }
        Err(e) => {
            tracing::warn!(user_id = %stored.user_id, error = %e, "Session refresh failed");
            SessionState::Absent
        }
    }
}
