use askama::Template;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Form,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use super::{error_fragment, success_fragment, validation_message};
use crate::models::{rating_label, AuthUser, Trip, TripRating};
use crate::AppState;

#[derive(Template)]
#[template(path = "trips.html")]
pub struct TripsTemplate {
    pub user: AuthUser,
    pub trips: Vec<Trip>,
    pub success_message: Option<&'static str>,
    pub notice: Option<&'static str>,
    pub load_error: Option<&'static str>,
    pub stars: [u8; 5],
    pub current_page: &'static str,
}

#[derive(Deserialize, Default)]
pub struct TripsQuery {
    pub cancelled: Option<String>,
    pub error: Option<String>,
}

#[derive(Deserialize, Validate)]
pub struct RatingRequest {
    #[serde(default)]
    #[validate(range(
        min = 1,
        max = 5,
        message = "Please select at least one star to rate this trip"
    ))]
    pub rating: u8,
    #[serde(default)]
    #[validate(length(max = 1000, message = "Feedback must be 1000 characters or fewer"))]
    pub feedback: String,
}

/// Notice for the `error` code the tracking page redirects with.
pub fn trips_notice(error: Option<&str>) -> Option<&'static str> {
    match error? {
        "trip_not_found" => Some("We couldn't find that trip."),
        "trip_not_in_progress" => Some("That trip is not in progress, so it can't be tracked."),
        "track_error" => Some("Something went wrong while tracking your trip. Please try again."),
        _ => None,
    }
}

pub async fn trips_page(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<TripsQuery>,
) -> impl IntoResponse {
    let success_message = (query.cancelled.as_deref() == Some("true"))
        .then_some("Your trip has been successfully cancelled.");

    let (trips, load_error) = match state.trips.list_trips(&user.access_token, &user.user_id).await
    {
        Ok(trips) => {
            tracing::debug!(user_id = %user.user_id, count = trips.len(), "Fetched trips");
            (trips, None)
        }
        Err(e) => {
            tracing::error!(user_id = %user.user_id, error = %e, "Error fetching trips");
            let message = if e.is_rejection() {
                "An error occurred while fetching your trips."
            } else {
                "Failed to fetch trips data. Please try again later."
            };
            (Vec::new(), Some(message))
        }
    };

    TripsTemplate {
        user,
        trips,
        success_message,
        notice: trips_notice(query.error.as_deref()),
        load_error,
        stars: [1, 2, 3, 4, 5],
        current_page: "trips",
    }
}

pub async fn submit_rating(
    State(state): State<AppState>,
    user: AuthUser,
    Path(trip_id): Path<Uuid>,
    Form(payload): Form<RatingRequest>,
) -> Response {
    if let Err(errors) = payload.validate() {
        return error_fragment(
            StatusCode::UNPROCESSABLE_ENTITY,
            &validation_message(&errors, &["rating", "feedback"]),
        );
    }

    let feedback = payload.feedback.trim();
    let rating = TripRating {
        rating: payload.rating,
        feedback: (!feedback.is_empty()).then(|| feedback.to_string()),
        updated_at: Utc::now(),
    };

    match state
        .trips
        .rate_trip(&user.access_token, trip_id, &rating)
        .await
    {
        Ok(Some(trip)) => {
            tracing::info!(user_id = %user.user_id, trip_id = %trip.id, rating = rating.rating, "Trip rated");
            success_fragment(&format!(
                "Thanks for your feedback! You rated this trip {}.",
                rating_label(rating.rating)
            ))
        }
        Ok(None) => error_fragment(StatusCode::NOT_FOUND, "We couldn't find that trip."),
        Err(e) => {
            tracing::error!(user_id = %user.user_id, trip_id = %trip_id, error = %e, "Error submitting rating");
            error_fragment(
                StatusCode::BAD_GATEWAY,
                "Failed to submit rating. Please try again.",
            )
        }
    }
}
