use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use portal_core::middleware::{request_id_middleware, security_headers_middleware};
use time::Duration;
use tower_http::compression::CompressionLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::handlers::{
    app::{health_check, index, metrics},
    auth::{
        login_handler, login_page, logout_handler, reset_password_handler, reset_password_page,
        signup_handler, signup_page, update_password_handler, update_password_page,
    },
    dashboard::dashboard_handler,
    tracking::{driver_location, track_page},
    trips::{submit_rating, trips_page},
};
use crate::middleware::{access_gate, metrics_middleware};
use crate::AppState;

pub fn build_router(state: AppState) -> Router {
    // Session setup
    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(state.server.secure_cookies)
        .with_expiry(Expiry::OnInactivity(Duration::hours(
            state.server.session_inactivity_hours,
        )));

    let static_dir = if std::path::Path::new("ride-portal/static").is_dir() {
        "ride-portal/static"
    } else {
        "static"
    };

    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .route("/login", get(login_page).post(login_handler))
        .route("/signup", get(signup_page).post(signup_handler))
        .route(
            "/reset-password",
            get(reset_password_page).post(reset_password_handler),
        )
        .route(
            "/update-password",
            get(update_password_page).post(update_password_handler),
        )
        .route("/logout", get(logout_handler).post(logout_handler))
        .route("/dashboard", get(dashboard_handler))
        .route("/dashboard/trips", get(trips_page))
        .route("/dashboard/trips/:trip_id/rating", post(submit_rating))
        .route("/dashboard/track/:trip_id", get(track_page))
        .route("/dashboard/track/:trip_id/location", get(driver_location))
        .nest_service("/static", ServeDir::new(static_dir))
        .route_layer(from_fn(metrics_middleware))
        // Gate runs inside the session layer so it can read and refresh sessions
        .layer(from_fn_with_state(state.clone(), access_gate))
        .layer(session_layer)
        .layer(from_fn(security_headers_middleware))
        .layer(CompressionLayer::new())
        // Add tracing layer
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        // Add tracing middleware for request_id
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}
