use askama::Template;
use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use chrono::Utc;
use serde::Deserialize;
use tower_sessions::Session;
use validator::Validate;

use super::{error_fragment, hx_redirect, success_fragment, validation_message};
use crate::gate::decision::DASHBOARD_PATH;
use crate::models::{AuthSession, AuthUser, CLIENT_ROLE};
use crate::services::SignUpOutcome;
use crate::AppState;

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub notice: Option<&'static str>,
    pub return_to: String,
}

#[derive(Template)]
#[template(path = "signup.html")]
pub struct SignUpTemplate {}

#[derive(Template)]
#[template(path = "reset_password.html")]
pub struct ResetPasswordTemplate {}

#[derive(Template)]
#[template(path = "update_password.html")]
pub struct UpdatePasswordTemplate {
    pub user: AuthUser,
    pub current_page: &'static str,
}

#[derive(Deserialize, Default)]
pub struct LoginQuery {
    #[serde(rename = "returnTo")]
    pub return_to: Option<String>,
    pub error: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub return_to: Option<String>,
}

#[derive(Deserialize, Validate)]
pub struct SignUpRequest {
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub confirm_password: String,
}

#[derive(Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
}

#[derive(Deserialize, Validate)]
pub struct UpdatePasswordRequest {
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub confirm_password: String,
}

/// Message shown on the login page for a gate `error` code.
pub fn login_notice(error: Option<&str>) -> Option<&'static str> {
    match error? {
        "access_denied" => Some("This account does not have access to the rider portal."),
        "server_error" => Some("We could not verify your account. Please try again."),
        _ => Some("Please sign in to continue."),
    }
}

/// Only same-origin paths are honoured as post-login targets.
pub fn safe_return_to(return_to: Option<&str>) -> &str {
    match return_to {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => {
            path
        }
        _ => DASHBOARD_PATH,
    }
}

async fn start_session(session: &Session, auth: &AuthSession) -> Result<(), Response> {
    // New id on every sign-in so a pre-login cookie cannot be reused
    if let Err(e) = session.cycle_id().await {
        tracing::error!(error = %e, "Failed to cycle session id");
        return Err(error_fragment(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Authentication error",
        ));
    }
    if let Err(e) = session.insert(AuthSession::KEY, auth).await {
        tracing::error!(error = %e, "Failed to store session");
        return Err(error_fragment(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Authentication error",
        ));
    }
    Ok(())
}

pub async fn login_page(Query(query): Query<LoginQuery>) -> impl IntoResponse {
    LoginTemplate {
        notice: login_notice(query.error.as_deref()),
        return_to: query.return_to.unwrap_or_default(),
    }
}

pub async fn login_handler(
    State(state): State<AppState>,
    session: Session,
    Form(payload): Form<LoginRequest>,
) -> Response {
    let grant = match state.auth.sign_in(&payload.email, &payload.password).await {
        Ok(grant) => grant,
        Err(e) if e.is_rejection() => {
            tracing::info!(error = %e, "Sign-in rejected");
            return error_fragment(
                StatusCode::UNPROCESSABLE_ENTITY,
                "Invalid email or password",
            );
        }
        Err(e) => {
            tracing::error!(error = %e, "Sign-in failed");
            return error_fragment(
                StatusCode::BAD_GATEWAY,
                "Sign-in is unavailable right now. Please try again.",
            );
        }
    };

    let auth = AuthSession::from_grant(grant, Utc::now().timestamp());
    if let Err(response) = start_session(&session, &auth).await {
        return response;
    }

    tracing::info!(user_id = %auth.user_id, "User logged in successfully");
    hx_redirect(safe_return_to(payload.return_to.as_deref()))
}

pub async fn signup_page() -> impl IntoResponse {
    SignUpTemplate {}
}

pub async fn signup_handler(
    State(state): State<AppState>,
    session: Session,
    Form(payload): Form<SignUpRequest>,
) -> Response {
    if let Err(errors) = payload.validate() {
        return error_fragment(
            StatusCode::UNPROCESSABLE_ENTITY,
            &validation_message(&errors, &["email", "password", "confirm_password"]),
        );
    }

    match state
        .auth
        .sign_up(&payload.email, &payload.password, CLIENT_ROLE)
        .await
    {
        Ok(SignUpOutcome::Session(grant)) => {
            let auth = AuthSession::from_grant(grant, Utc::now().timestamp());
            if let Err(response) = start_session(&session, &auth).await {
                return response;
            }
            tracing::info!(user_id = %auth.user_id, "User signed up");
            hx_redirect(DASHBOARD_PATH)
        }
        Ok(SignUpOutcome::ConfirmationPending) => {
            success_fragment("Registration successful! Please check your email.")
        }
        Err(e) => {
            tracing::warn!(error = %e, "Sign-up failed");
            error_fragment(
                StatusCode::UNPROCESSABLE_ENTITY,
                "Registration failed. Email might already be in use.",
            )
        }
    }
}

pub async fn reset_password_page() -> impl IntoResponse {
    ResetPasswordTemplate {}
}

pub async fn reset_password_handler(
    State(state): State<AppState>,
    Form(payload): Form<ResetPasswordRequest>,
) -> Response {
    if let Err(errors) = payload.validate() {
        return error_fragment(
            StatusCode::UNPROCESSABLE_ENTITY,
            &validation_message(&errors, &["email"]),
        );
    }

    let redirect_to = format!(
        "{}/update-password",
        state.server.public_url.trim_end_matches('/')
    );
    match state
        .auth
        .send_password_reset(&payload.email, &redirect_to)
        .await
    {
        Ok(()) => success_fragment("If an account exists for that email, a reset link is on its way."),
        Err(e) => {
            tracing::error!(error = %e, "Failed to send password reset");
            error_fragment(
                StatusCode::BAD_GATEWAY,
                "We could not send the reset email. Please try again.",
            )
        }
    }
}

pub async fn update_password_page(user: AuthUser) -> impl IntoResponse {
    UpdatePasswordTemplate {
        user,
        current_page: "settings",
    }
}

pub async fn update_password_handler(
    State(state): State<AppState>,
    user: AuthUser,
    Form(payload): Form<UpdatePasswordRequest>,
) -> Response {
    if let Err(errors) = payload.validate() {
        return error_fragment(
            StatusCode::UNPROCESSABLE_ENTITY,
            &validation_message(&errors, &["password", "confirm_password"]),
        );
    }

    match state
        .auth
        .update_password(&user.access_token, &payload.password)
        .await
    {
        Ok(()) => {
            tracing::info!(user_id = %user.user_id, "Password updated");
            hx_redirect(DASHBOARD_PATH)
        }
        Err(e) => {
            tracing::warn!(user_id = %user.user_id, error = %e, "Password update failed");
            error_fragment(
                StatusCode::UNPROCESSABLE_ENTITY,
                "Could not update your password. Please try again.",
            )
        }
    }
}

pub async fn logout_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    session: Session,
) -> Response {
    match session.get::<AuthSession>(AuthSession::KEY).await {
        Ok(Some(auth)) => {
            // Logout completes locally even if the backend cannot revoke
            if let Err(e) = state.auth.sign_out(&auth.access_token).await {
                tracing::error!(user_id = %auth.user_id, error = %e, "Failed to revoke session during logout");
            } else {
                tracing::info!(user_id = %auth.user_id, "Session revoked");
            }
        }
        Ok(None) => {}
        Err(e) => tracing::warn!(error = %e, "Failed to read session during logout"),
    }

    if let Err(e) = session.flush().await {
        tracing::error!(error = %e, "Failed to clear session");
    }

    if headers.contains_key("hx-request") {
        hx_redirect("/")
    } else {
        Redirect::to("/").into_response()
    }
}
