use async_trait::async_trait;
use portal_core::observability::PropagateTrace;
use reqwest::{Client, Method, RequestBuilder, Response};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::config::BackendSettings;
use crate::models::{Profile, TokenGrant, Trip, TripRating};
use crate::services::stores::{
    AuthGateway, BackendError, ProfileStore, SignUpOutcome, TripStore,
};

/// Client for the hosted auth (`/auth/v1`) and data (`/rest/v1`) APIs.
///
/// No timeout or retry is configured: every call waits for the backend to
/// answer or fail.
pub struct BackendClient {
    client: Client,
    base_url: String,
    anon_key: Secret<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Session(TokenGrant),
    User(serde_json::Value),
}

impl BackendClient {
    pub fn new(settings: BackendSettings) -> Self {
        Self {
            client: Client::new(),
            base_url: settings.url.trim_end_matches('/').to_string(),
            anon_key: settings.anon_key,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1{}", self.base_url, path)
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    /// Every call carries the anon key; user-scoped calls swap the bearer for
    /// the rider's access token so row-level security applies.
    fn request(&self, method: Method, url: &str, access_token: Option<&str>) -> RequestBuilder {
        let anon_key = self.anon_key.expose_secret();
        self.client
            .request(method, url)
            .header("apikey", anon_key.as_str())
            .bearer_auth(access_token.unwrap_or(anon_key.as_str()))
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, BackendError> {
        let response = request.with_trace_context().send().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to reach hosted backend");
            BackendError::Transport(e)
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(BackendError::Rejected {
            status,
            message: error_message(&body),
        })
    }
}

/// Pull a readable message out of an auth or data API error body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            ["error_description", "msg", "message", "error"]
                .iter()
                .find_map(|key| value.get(*key).and_then(|v| v.as_str()).map(str::to_string))
        })
        .unwrap_or_else(|| body.to_string())
}

#[async_trait]
impl AuthGateway for BackendClient {
    async fn sign_in(&self, email: &str, password: &str) -> Result<TokenGrant, BackendError> {
        let url = self.auth_url("/token");
        let request = self
            .request(Method::POST, &url, None)
            .query(&[("grant_type", "password")])
            .json(&json!({ "email": email, "password": password }));

        Ok(self.send(request).await?.json::<TokenGrant>().await?)
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        role: &str,
    ) -> Result<SignUpOutcome, BackendError> {
        let url = self.auth_url("/signup");
        let request = self.request(Method::POST, &url, None).json(&json!({
            "email": email,
            "password": password,
            "data": { "role": role },
        }));

        match self.send(request).await?.json::<SignUpResponse>().await? {
            SignUpResponse::Session(grant) => Ok(SignUpOutcome::Session(grant)),
            SignUpResponse::User(_) => Ok(SignUpOutcome::ConfirmationPending),
        }
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<TokenGrant, BackendError> {
        let url = self.auth_url("/token");
        let request = self
            .request(Method::POST, &url, None)
            .query(&[("grant_type", "refresh_token")])
            .json(&json!({ "refresh_token": refresh_token }));

        Ok(self.send(request).await?.json::<TokenGrant>().await?)
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), BackendError> {
        let url = self.auth_url("/logout");
        self.send(self.request(Method::POST, &url, Some(access_token)))
            .await?;
        Ok(())
    }

    async fn send_password_reset(
        &self,
        email: &str,
        redirect_to: &str,
    ) -> Result<(), BackendError> {
        let url = self.auth_url("/recover");
        let request = self
            .request(Method::POST, &url, None)
            .query(&[("redirect_to", redirect_to)])
            .json(&json!({ "email": email }));

        self.send(request).await?;
        Ok(())
    }

    async fn update_password(
        &self,
        access_token: &str,
        new_password: &str,
    ) -> Result<(), BackendError> {
        let url = self.auth_url("/user");
        let request = self
            .request(Method::PUT, &url, Some(access_token))
            .json(&json!({ "password": new_password }));

        self.send(request).await?;
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for BackendClient {
    async fn fetch_profile(
        &self,
        access_token: &str,
        user_id: &str,
    ) -> Result<Option<Profile>, BackendError> {
        let url = self.rest_url("profiles");
        let id_filter = format!("eq.{}", user_id);
        let request = self
            .request(Method::GET, &url, Some(access_token))
            .query(&[("id", id_filter.as_str()), ("select", "role")]);

        let rows: Vec<Profile> = self.send(request).await?.json().await?;
        Ok(rows.into_iter().next())
    }
}

#[async_trait]
impl TripStore for BackendClient {
    async fn list_trips(
        &self,
        access_token: &str,
        user_id: &str,
    ) -> Result<Vec<Trip>, BackendError> {
        let url = self.rest_url("trips");
        let user_filter = format!("eq.{}", user_id);
        let request = self
            .request(Method::GET, &url, Some(access_token))
            .query(&[
                ("user_id", user_filter.as_str()),
                ("select", "*"),
                ("order", "created_at.desc"),
            ]);

        Ok(self.send(request).await?.json().await?)
    }

    async fn find_trip(
        &self,
        access_token: &str,
        trip_id: Uuid,
        user_id: &str,
    ) -> Result<Option<Trip>, BackendError> {
        let url = self.rest_url("trips");
        let id_filter = format!("eq.{}", trip_id);
        let user_filter = format!("eq.{}", user_id);
        let request = self
            .request(Method::GET, &url, Some(access_token))
            .query(&[
                ("id", id_filter.as_str()),
                ("user_id", user_filter.as_str()),
                ("select", "*"),
            ]);

        let rows: Vec<Trip> = self.send(request).await?.json().await?;
        Ok(rows.into_iter().next())
    }

    async fn rate_trip(
        &self,
        access_token: &str,
        trip_id: Uuid,
        rating: &TripRating,
    ) -> Result<Option<Trip>, BackendError> {
        let url = self.rest_url("trips");
        let id_filter = format!("eq.{}", trip_id);
        let request = self
            .request(Method::PATCH, &url, Some(access_token))
            .query(&[("id", id_filter.as_str())])
            .header("Prefer", "return=representation")
            .json(rating);

        let rows: Vec<Trip> = self.send(request).await?.json().await?;
        Ok(rows.into_iter().next())
    }
}
