//! Counting fakes for the gate's unit tests.

use async_trait::async_trait;
use reqwest::StatusCode;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::models::{AuthSession, Profile, RoleClaim, TokenGrant};
use crate::services::{AuthGateway, BackendError, ProfileStore, SignUpOutcome};

pub fn grant(user_id: &str, role: Option<&str>, expires_at: i64) -> TokenGrant {
    serde_json::from_value(serde_json::json!({
        "access_token": format!("access-{user_id}-{expires_at}"),
        "refresh_token": format!("refresh-{user_id}-{expires_at}"),
        "expires_at": expires_at,
        "user": {
            "id": user_id,
            "email": format!("{user_id}@example.com"),
            "user_metadata": { "role": role },
        },
    }))
    .unwrap()
}

pub fn session_for(user_id: &str, role: RoleClaim, expires_at: i64) -> AuthSession {
    AuthSession {
        user_id: user_id.to_string(),
        email: Some(format!("{user_id}@example.com")),
        role,
        access_token: format!("access-{user_id}"),
        refresh_token: format!("refresh-{user_id}"),
        expires_at,
    }
}

fn rejected(status: StatusCode) -> BackendError {
    BackendError::Rejected {
        status,
        message: "rejected by fake".to_string(),
    }
}

#[derive(Clone, Copy, Default)]
enum RefreshMode {
    #[default]
    Reject,
    Grant,
    Fail,
}

#[derive(Default)]
pub struct FakeAuth {
    refresh_mode: RefreshMode,
    refresh_grant: Mutex<Option<TokenGrant>>,
    sign_out_fails: bool,
    pub refresh_calls: AtomicUsize,
    pub sign_out_calls: AtomicUsize,
}

impl FakeAuth {
    pub fn refreshing_to(grant: TokenGrant) -> Self {
        Self {
            refresh_mode: RefreshMode::Grant,
            refresh_grant: Mutex::new(Some(grant)),
            ..Self::default()
        }
    }

    pub fn rejecting_refresh() -> Self {
        Self::default()
    }

    pub fn failing_sign_out() -> Self {
        Self {
            sign_out_fails: true,
            ..Self::default()
        }
    }

    pub fn failing_refresh() -> Self {
        Self {
            refresh_mode: RefreshMode::Fail,
            ..Self::default()
        }
    }
}

#[async_trait]
impl AuthGateway for FakeAuth {
    async fn sign_in(&self, _email: &str, _password: &str) -> Result<TokenGrant, BackendError> {
        Err(rejected(StatusCode::BAD_REQUEST))
    }

    async fn sign_up(
        &self,
        _email: &str,
        _password: &str,
        _role: &str,
    ) -> Result<SignUpOutcome, BackendError> {
        Ok(SignUpOutcome::ConfirmationPending)
    }

    async fn refresh_session(&self, _refresh_token: &str) -> Result<TokenGrant, BackendError> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        match self.refresh_mode {
            RefreshMode::Grant => self
                .refresh_grant
                .lock()
                .unwrap()
                .clone()
                .ok_or_else(|| rejected(StatusCode::BAD_REQUEST)),
            RefreshMode::Reject => Err(rejected(StatusCode::BAD_REQUEST)),
            RefreshMode::Fail => Err(rejected(StatusCode::SERVICE_UNAVAILABLE)),
        }
    }

    async fn sign_out(&self, _access_token: &str) -> Result<(), BackendError> {
        self.sign_out_calls.fetch_add(1, Ordering::SeqCst);
        if self.sign_out_fails {
            return Err(rejected(StatusCode::BAD_GATEWAY));
        }
        Ok(())
    }

    async fn send_password_reset(
        &self,
        _email: &str,
        _redirect_to: &str,
    ) -> Result<(), BackendError> {
        Ok(())
    }

    async fn update_password(
        &self,
        _access_token: &str,
        _new_password: &str,
    ) -> Result<(), BackendError> {
        Ok(())
    }
}

/// Profile store answering every lookup the same way.
pub struct FakeProfiles {
    answer: Result<Option<Option<String>>, StatusCode>,
    pub calls: AtomicUsize,
}

impl FakeProfiles {
    pub fn with_role(role: &str) -> Self {
        Self::answering(Ok(Some(Some(role.to_string()))))
    }

    pub fn with_null_role() -> Self {
        Self::answering(Ok(Some(None)))
    }

    pub fn missing() -> Self {
        Self::answering(Ok(None))
    }

    pub fn failing() -> Self {
        Self::answering(Err(StatusCode::INTERNAL_SERVER_ERROR))
    }

    fn answering(answer: Result<Option<Option<String>>, StatusCode>) -> Self {
        Self {
            answer,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProfileStore for FakeProfiles {
    async fn fetch_profile(
        &self,
        _access_token: &str,
        _user_id: &str,
    ) -> Result<Option<Profile>, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.answer {
            Ok(row) => Ok(row.clone().map(|role| Profile { role })),
            Err(status) => Err(rejected(*status)),
        }
    }
}
