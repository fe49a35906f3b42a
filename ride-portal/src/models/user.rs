use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use super::session::{AuthSession, RoleClaim};

/// Authenticated rider, taken from the gate's request extension or, on
/// ungated routes, straight from the session store.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
    pub email: Option<String>,
    pub role: RoleClaim,
    pub access_token: String,
    pub display_name: String,
}

impl AuthUser {
    pub fn email_label(&self) -> &str {
        self.email.as_deref().unwrap_or("your account")
    }
}

impl From<AuthSession> for AuthUser {
    fn from(session: AuthSession) -> Self {
        let display_name = session.display_name();
        Self {
            user_id: session.user_id,
            email: session.email,
            role: session.role,
            access_token: session.access_token,
            display_name,
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(session) = parts.extensions.get::<AuthSession>() {
            return Ok(session.clone().into());
        }

        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|_| {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to extract session",
                )
                    .into_response()
            })?;

        match session.get::<AuthSession>(AuthSession::KEY).await {
            Ok(Some(auth)) => Ok(auth.into()),
            Ok(None) => Err(Redirect::to("/login").into_response()),
            Err(e) => {
                tracing::error!(error = %e, "Failed to load session record");
                Err(Redirect::to("/login?error=server_error").into_response())
            }
        }
    }
}
