use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Lifetime assumed when the backend omits both `expires_at` and `expires_in`.
const DEFAULT_TOKEN_TTL_SECS: i64 = 3600;

/// The only role allowed through protected paths.
pub const CLIENT_ROLE: &str = "client";

/// Role asserted by the user metadata embedded in a token grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum RoleClaim {
    Present(String),
    Absent,
}

impl RoleClaim {
    pub fn is_client(&self) -> bool {
        matches!(self, RoleClaim::Present(role) if role == CLIENT_ROLE)
    }

    pub fn as_deref(&self) -> Option<&str> {
        match self {
            RoleClaim::Present(role) => Some(role),
            RoleClaim::Absent => None,
        }
    }
}

impl From<Option<String>> for RoleClaim {
    fn from(value: Option<String>) -> Self {
        match value {
            Some(role) => RoleClaim::Present(role),
            None => RoleClaim::Absent,
        }
    }
}

impl From<RoleClaim> for Option<String> {
    fn from(value: RoleClaim) -> Self {
        match value {
            RoleClaim::Present(role) => Some(role),
            RoleClaim::Absent => None,
        }
    }
}

/// Token response from the hosted auth API (sign-in, sign-up and refresh).
#[derive(Debug, Clone, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: GrantUser,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GrantUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: Option<Map<String, Value>>,
}

impl GrantUser {
    pub fn role_claim(&self) -> RoleClaim {
        self.user_metadata
            .as_ref()
            .and_then(|metadata| metadata.get("role"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .into()
    }
}

/// Authenticated session kept server-side under [`AuthSession::KEY`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthSession {
    pub user_id: String,
    pub email: Option<String>,
    pub role: RoleClaim,
    pub access_token: String,
    pub refresh_token: String,
    /// Unix seconds.
    pub expires_at: i64,
}

impl AuthSession {
    pub const KEY: &'static str = "auth";

    pub fn from_grant(grant: TokenGrant, now: i64) -> Self {
        let expires_at = grant
            .expires_at
            .or_else(|| grant.expires_in.map(|secs| now.saturating_add(secs)))
            .unwrap_or(now.saturating_add(DEFAULT_TOKEN_TTL_SECS));
        let role = grant.user.role_claim();

        Self {
            user_id: grant.user.id,
            email: grant.user.email,
            role,
            access_token: grant.access_token,
            refresh_token: grant.refresh_token,
            expires_at,
        }
    }

    pub fn needs_refresh(&self, now: i64, margin_secs: i64) -> bool {
        self.expires_at <= now.saturating_add(margin_secs)
    }

    pub fn display_name(&self) -> String {
        self.email
            .as_deref()
            .and_then(|email| email.split('@').next())
            .filter(|name| !name.is_empty())
            .unwrap_or("Rider")
            .to_string()
    }
}
