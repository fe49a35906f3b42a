//! Seams to the hosted backend.
//!
//! The gate and the page handlers only talk to these traits; the reqwest
//! implementation lives in [`super::backend`], tests plug in fakes.

use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Profile, TokenGrant, Trip, TripRating};

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("hosted backend request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("hosted backend rejected request with {status}: {message}")]
    Rejected { status: StatusCode, message: String },
}

impl BackendError {
    /// The backend answered and said no (4xx), as opposed to being unreachable
    /// or failing internally.
    pub fn is_rejection(&self) -> bool {
        matches!(self, BackendError::Rejected { status, .. } if status.is_client_error())
    }
}

/// Result of a sign-up: a live session when email confirmation is off,
/// otherwise nothing until the user confirms.
#[derive(Debug, Clone)]
pub enum SignUpOutcome {
    Session(TokenGrant),
    ConfirmationPending,
}

#[async_trait]
pub trait AuthGateway: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<TokenGrant, BackendError>;

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        role: &str,
    ) -> Result<SignUpOutcome, BackendError>;

    async fn refresh_session(&self, refresh_token: &str) -> Result<TokenGrant, BackendError>;

    async fn sign_out(&self, access_token: &str) -> Result<(), BackendError>;

    async fn send_password_reset(&self, email: &str, redirect_to: &str)
        -> Result<(), BackendError>;

    async fn update_password(
        &self,
        access_token: &str,
        new_password: &str,
    ) -> Result<(), BackendError>;
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// `Ok(None)` when no profile row exists for the user.
    async fn fetch_profile(
        &self,
        access_token: &str,
        user_id: &str,
    ) -> Result<Option<Profile>, BackendError>;
}

#[async_trait]
pub trait TripStore: Send + Sync {
    /// Newest first.
    async fn list_trips(&self, access_token: &str, user_id: &str)
        -> Result<Vec<Trip>, BackendError>;

    async fn find_trip(
        &self,
        access_token: &str,
        trip_id: Uuid,
        user_id: &str,
    ) -> Result<Option<Trip>, BackendError>;

    /// `Ok(None)` when no trip with that id is visible to the caller.
    async fn rate_trip(
        &self,
        access_token: &str,
        trip_id: Uuid,
        rating: &TripRating,
    ) -> Result<Option<Trip>, BackendError>;
}
