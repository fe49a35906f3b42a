use askama::Template;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    Json,
};
use portal_core::error::AppError;
use uuid::Uuid;

use crate::gate::decision::redirect_response;
use crate::models::{AuthUser, DriverLocation, Trip};
use crate::services::tracking::simulate_driver_location;
use crate::AppState;

#[derive(Template)]
#[template(path = "track.html")]
pub struct TrackTemplate {
    pub user: AuthUser,
    pub trip: Trip,
    pub location: DriverLocation,
    pub current_page: &'static str,
}

/// Why a trip cannot be tracked right now.
#[derive(Debug)]
enum Untrackable {
    NotFound,
    NotInProgress(Uuid),
    Unavailable(String),
}

impl Untrackable {
    fn trips_location(&self) -> String {
        let query = match self {
            Untrackable::NotFound => serde_urlencoded::to_string([("error", "trip_not_found")]),
            Untrackable::NotInProgress(id) => serde_urlencoded::to_string([
                ("error", "trip_not_in_progress".to_string()),
                ("id", id.to_string()),
            ]),
            Untrackable::Unavailable(_) => serde_urlencoded::to_string([("error", "track_error")]),
        };
        match query {
            Ok(query) => format!("/dashboard/trips?{}", query),
            Err(_) => "/dashboard/trips".to_string(),
        }
    }
}

impl From<Untrackable> for AppError {
    fn from(reason: Untrackable) -> Self {
        match reason {
            Untrackable::NotFound => AppError::NotFound(anyhow::anyhow!("Trip not found")),
            Untrackable::NotInProgress(id) => {
                AppError::Conflict(anyhow::anyhow!("Trip {} is not in progress", id))
            }
            Untrackable::Unavailable(msg) => AppError::BadGateway(msg),
        }
    }
}

/// Load the rider's own trip and require it to be in progress.
async fn trackable_trip(
    state: &AppState,
    user: &AuthUser,
    trip_id: &str,
) -> Result<Trip, Untrackable> {
    let trip_id = Uuid::parse_str(trip_id).map_err(|_| Untrackable::NotFound)?;

    let trip = match state
        .trips
        .find_trip(&user.access_token, trip_id, &user.user_id)
        .await
    {
        Ok(Some(trip)) => trip,
        Ok(None) => return Err(Untrackable::NotFound),
        Err(e) if e.is_rejection() => {
            tracing::warn!(user_id = %user.user_id, trip_id = %trip_id, error = %e, "Error fetching trip");
            return Err(Untrackable::NotFound);
        }
        Err(e) => {
            tracing::error!(user_id = %user.user_id, trip_id = %trip_id, error = %e, "Error fetching trip");
            return Err(Untrackable::Unavailable(e.to_string()));
        }
    };

    if !trip.can_track() {
        return Err(Untrackable::NotInProgress(trip.id));
    }
    Ok(trip)
}

pub async fn track_page(
    State(state): State<AppState>,
    user: AuthUser,
    Path(trip_id): Path<String>,
) -> Response {
    match trackable_trip(&state, &user, &trip_id).await {
        Ok(trip) => {
            let location = simulate_driver_location(&mut rand::thread_rng());
            TrackTemplate {
                user,
                trip,
                location,
                current_page: "trips",
            }
            .into_response()
        }
        Err(reason) => redirect_response(reason.trips_location()),
    }
}

/// Polled by the tracking page for fresh driver coordinates.
pub async fn driver_location(
    State(state): State<AppState>,
    user: AuthUser,
    Path(trip_id): Path<String>,
) -> Result<Json<DriverLocation>, AppError> {
    trackable_trip(&state, &user, &trip_id).await?;
    Ok(Json(simulate_driver_location(&mut rand::thread_rng())))
}
