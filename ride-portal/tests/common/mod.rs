#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use chrono::{Duration, Utc};
use reqwest::StatusCode as BackendStatus;
use ride_portal::config::{GateSettings, ServerSettings};
use ride_portal::models::{GrantUser, Profile, TokenGrant, Trip, TripRating, TripStatus};
use ride_portal::services::{AuthGateway, BackendError, ProfileStore, SignUpOutcome, TripStore};
use ride_portal::startup::build_router;
use ride_portal::AppState;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tower::util::ServiceExt;
use uuid::Uuid;

pub const PASSWORD: &str = "correct-horse";

/// Profile row state for a fake account.
#[derive(Clone)]
pub enum ProfileRow {
    Missing,
    Role(Option<String>),
}

#[derive(Clone)]
pub struct Account {
    pub user_id: String,
    pub email: String,
    pub claim: Option<String>,
    pub profile: ProfileRow,
}

/// In-memory stand-in for the hosted backend.
pub struct FakeBackend {
    accounts: Mutex<Vec<Account>>,
    trips: Mutex<Vec<Trip>>,
    pub token_ttl_secs: AtomicI64,
    pub reject_refresh: AtomicBool,
    pub fail_profiles: AtomicBool,
    pub fail_trips: AtomicBool,
    pub fail_sign_out: AtomicBool,
    pub profile_lookups: AtomicUsize,
    pub refresh_calls: AtomicUsize,
    pub sign_outs: Mutex<Vec<String>>,
    pub ratings: Mutex<Vec<(Uuid, TripRating)>>,
}

impl Default for FakeBackend {
    fn default() -> Self {
        Self {
            accounts: Mutex::new(Vec::new()),
            trips: Mutex::new(Vec::new()),
            token_ttl_secs: AtomicI64::new(3600),
            reject_refresh: AtomicBool::new(false),
            fail_profiles: AtomicBool::new(false),
            fail_trips: AtomicBool::new(false),
            fail_sign_out: AtomicBool::new(false),
            profile_lookups: AtomicUsize::new(0),
            refresh_calls: AtomicUsize::new(0),
            sign_outs: Mutex::new(Vec::new()),
            ratings: Mutex::new(Vec::new()),
        }
    }
}

impl FakeBackend {
    pub fn with_account(self, email: &str, claim: Option<&str>, profile: ProfileRow) -> Self {
        let user_id = format!("user-{}", email.split('@').next().unwrap());
        self.accounts.lock().unwrap().push(Account {
            user_id,
            email: email.to_string(),
            claim: claim.map(str::to_string),
            profile,
        });
        self
    }

    /// Shortcut for a rider whose token carries the client role.
    pub fn with_rider(self, email: &str) -> Self {
        self.with_account(email, Some("client"), ProfileRow::Role(Some("client".into())))
    }

    pub fn with_trip(self, trip: Trip) -> Self {
        self.trips.lock().unwrap().push(trip);
        self
    }

    pub fn user_id(&self, email: &str) -> String {
        self.account_by_email(email).unwrap().user_id
    }

    fn account_by_email(&self, email: &str) -> Option<Account> {
        self.accounts
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.email == email)
            .cloned()
    }

    fn account_by(&self, pred: impl Fn(&Account) -> bool) -> Option<Account> {
        self.accounts.lock().unwrap().iter().find(|a| pred(a)).cloned()
    }

    fn grant_for(&self, account: &Account) -> TokenGrant {
        let metadata = account.claim.as_ref().map(|role| {
            let mut map = serde_json::Map::new();
            map.insert("role".into(), serde_json::Value::String(role.clone()));
            map
        });
        TokenGrant {
            access_token: format!("access-{}-{}", account.user_id, Uuid::new_v4()),
            refresh_token: format!("refresh-{}", account.user_id),
            expires_in: Some(self.token_ttl_secs.load(Ordering::SeqCst)),
            expires_at: None,
            user: GrantUser {
                id: account.user_id.clone(),
                email: Some(account.email.clone()),
                user_metadata: metadata,
            },
        }
    }

    fn owner_of(access_token: &str) -> String {
        // access-<user_id>-<uuid>; uuids are 36 chars
        let rest = access_token.trim_start_matches("access-");
        rest[..rest.len().saturating_sub(37)].to_string()
    }
}

fn rejected(status: BackendStatus, message: &str) -> BackendError {
    BackendError::Rejected {
        status,
        message: message.to_string(),
    }
}

#[async_trait]
impl AuthGateway for FakeBackend {
    async fn sign_in(&self, email: &str, password: &str) -> Result<TokenGrant, BackendError> {
        match self.account_by_email(email) {
            Some(account) if password == PASSWORD => Ok(self.grant_for(&account)),
            _ => Err(rejected(
                BackendStatus::BAD_REQUEST,
                "Invalid login credentials",
            )),
        }
    }

    async fn sign_up(
        &self,
        email: &str,
        _password: &str,
        role: &str,
    ) -> Result<SignUpOutcome, BackendError> {
        if self.account_by_email(email).is_some() {
            return Err(rejected(
                BackendStatus::UNPROCESSABLE_ENTITY,
                "User already registered",
            ));
        }
        let account = Account {
            user_id: format!("user-{}", email.split('@').next().unwrap_or("new")),
            email: email.to_string(),
            claim: Some(role.to_string()),
            profile: ProfileRow::Role(Some(role.to_string())),
        };
        self.accounts.lock().unwrap().push(account.clone());
        Ok(SignUpOutcome::Session(self.grant_for(&account)))
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<TokenGrant, BackendError> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        if self.reject_refresh.load(Ordering::SeqCst) {
            return Err(rejected(
                BackendStatus::BAD_REQUEST,
                "Invalid Refresh Token",
            ));
        }
        let account = self
            .account_by(|a| format!("refresh-{}", a.user_id) == refresh_token)
            .ok_or_else(|| rejected(BackendStatus::BAD_REQUEST, "Invalid Refresh Token"))?;
        // Refreshed tokens always get a full hour
        let mut grant = self.grant_for(&account);
        grant.expires_in = Some(3600);
        Ok(grant)
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), BackendError> {
        self.sign_outs
            .lock()
            .unwrap()
            .push(Self::owner_of(access_token));
        if self.fail_sign_out.load(Ordering::SeqCst) {
            return Err(rejected(BackendStatus::BAD_GATEWAY, "auth service unavailable"));
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

#[async_trait]
impl ProfileStore for FakeBackend {
    async fn fetch_profile(
        &self,
        _access_token: &str,
        user_id: &str,
    ) -> Result<Option<Profile>, BackendError> {
        self.profile_lookups.fetch_add(1, Ordering::SeqCst);
        if self.fail_profiles.load(Ordering::SeqCst) {
            return Err(rejected(
                BackendStatus::SERVICE_UNAVAILABLE,
                "database unavailable",
            ));
        }
        Ok(self
            .account_by(|a| a.user_id == user_id)
            .and_then(|a| match a.profile {
                ProfileRow::Missing => None,
                ProfileRow::Role(role) => Some(Profile { role }),
            }))
    }
}

#[async_trait]
impl TripStore for FakeBackend {
    async fn list_trips(
        &self,
        _access_token: &str,
        user_id: &str,
    ) -> Result<Vec<Trip>, BackendError> {
        if self.fail_trips.load(Ordering::SeqCst) {
            return Err(rejected(BackendStatus::BAD_GATEWAY, "upstream down"));
        }
        let mut trips: Vec<Trip> = self
            .trips
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect();
        trips.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(trips)
    }

    async fn find_trip(
        &self,
        _access_token: &str,
        trip_id: Uuid,
        user_id: &str,
    ) -> Result<Option<Trip>, BackendError> {
        if self.fail_trips.load(Ordering::SeqCst) {
            return Err(rejected(BackendStatus::BAD_GATEWAY, "upstream down"));
        }
        Ok(self
            .trips
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.id == trip_id && t.user_id == user_id)
            .cloned())
    }

    async fn rate_trip(
        &self,
        access_token: &str,
        trip_id: Uuid,
        rating: &TripRating,
    ) -> Result<Option<Trip>, BackendError> {
        let owner = Self::owner_of(access_token);
        let mut trips = self.trips.lock().unwrap();
        let Some(trip) = trips
            .iter_mut()
            .find(|t| t.id == trip_id && t.user_id == owner)
        else {
            return Ok(None);
        };
        trip.rating = Some(rating.rating);
        trip.feedback = rating.feedback.clone();
        trip.updated_at = Some(rating.updated_at);
        self.ratings
            .lock()
            .unwrap()
            .push((trip_id, rating.clone()));
        Ok(Some(trip.clone()))
    }
}

pub fn trip(user_id: &str, status: TripStatus, age_minutes: i64) -> Trip {
    let created_at = Utc::now() - Duration::minutes(age_minutes);
    Trip {
        id: Uuid::new_v4(),
        user_id: user_id.to_string(),
        pickup_address: Some("1 Market St".to_string()),
        destination_address: Some("500 Castro St".to_string()),
        pickup_time: Some(created_at),
        status,
        price: Some(18.4),
        driver_name: Some("Sam".to_string()),
        rating: None,
        feedback: None,
        created_at,
        updated_at: None,
    }
}

pub struct TestApp {
    pub router: Router,
    pub backend: Arc<FakeBackend>,
}

pub fn spawn_app(backend: FakeBackend) -> TestApp {
    let backend = Arc::new(backend);
    let server = ServerSettings {
        host: "127.0.0.1".to_string(),
        port: 0,
        public_url: "http://portal.test".to_string(),
        secure_cookies: false,
        session_inactivity_hours: 24,
    };
    let state = AppState::from_backend(backend.clone(), GateSettings::default(), server);
    TestApp {
        router: build_router(state),
        backend,
    }
}

impl TestApp {
    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response {
        let mut builder = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.router
            .clone()
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    pub async fn post_form(&self, uri: &str, form: &[(&str, &str)], cookie: Option<&str>) -> Response {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header("hx-request", "true");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let body = serde_urlencoded::to_string(form).unwrap();
        self.router
            .clone()
            .oneshot(builder.body(Body::from(body)).unwrap())
            .await
            .unwrap()
    }

    /// Sign in through the login form and return the session cookie pair.
    pub async fn login(&self, email: &str) -> String {
        let response = self
            .post_form("/login", &[("email", email), ("password", PASSWORD)], None)
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        session_cookie(&response).expect("login should set a session cookie")
    }
}

/// `name=value` of the session cookie set on a response, if any.
pub fn session_cookie(response: &Response) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find(|value| value.starts_with("id="))
        .and_then(|value| value.split(';').next())
        .map(str::to_string)
}

pub fn location(response: &Response) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .expect("redirect should carry a Location header")
        .to_str()
        .unwrap()
        .to_string()
}

/// Decoded query pairs of a `Location` header.
pub fn location_query(response: &Response) -> Vec<(String, String)> {
    let location = location(response);
    let query = location.split_once('?').map(|(_, q)| q).unwrap_or("");
    serde_urlencoded::from_str(query).unwrap()
}

pub async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
