use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TripStatus {
    Pending,
    Upcoming,
    InProgress,
    Completed,
    Cancelled,
    #[serde(other)]
    Unknown,
}

impl TripStatus {
    pub fn label(&self) -> &'static str {
        match self {
            TripStatus::Pending => "Pending",
            TripStatus::Upcoming => "Upcoming",
            TripStatus::InProgress => "In progress",
            TripStatus::Completed => "Completed",
            TripStatus::Cancelled => "Cancelled",
            TripStatus::Unknown => "Unknown",
        }
    }
}

/// Row of the backend `trips` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    pub id: Uuid,
    pub user_id: String,
    #[serde(default)]
    pub pickup_address: Option<String>,
    #[serde(default)]
    pub destination_address: Option<String>,
    #[serde(default)]
    pub pickup_time: Option<DateTime<Utc>>,
    pub status: TripStatus,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub driver_name: Option<String>,
    #[serde(default)]
    pub rating: Option<u8>,
    #[serde(default)]
    pub feedback: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Trip {
    pub fn pickup_label(&self) -> &str {
        self.pickup_address.as_deref().unwrap_or("Pickup not set")
    }

    pub fn destination_label(&self) -> &str {
        self.destination_address
            .as_deref()
            .unwrap_or("Destination not set")
    }

    pub fn pickup_time_label(&self) -> String {
        self.pickup_time
            .map(|t| t.format("%b %e, %Y %H:%M").to_string())
            .unwrap_or_else(|| "Not scheduled".to_string())
    }

    pub fn feedback_text(&self) -> &str {
        self.feedback.as_deref().unwrap_or_default()
    }

    pub fn price_label(&self) -> String {
        self.price
            .map(|p| format!("${:.2}", p))
            .unwrap_or_else(|| "-".to_string())
    }

    pub fn driver_label(&self) -> &str {
        self.driver_name.as_deref().unwrap_or("Driver pending")
    }

    pub fn current_rating(&self) -> u8 {
        self.rating.unwrap_or(0)
    }

    pub fn is_star_selected(&self, star: &u8) -> bool {
        *star <= self.current_rating()
    }

    pub fn rating_text(&self) -> &'static str {
        rating_label(self.current_rating())
    }

    pub fn can_rate(&self) -> bool {
        self.status == TripStatus::Completed
    }

    pub fn can_track(&self) -> bool {
        self.status == TripStatus::InProgress
    }
}

/// Human label for a star rating.
pub fn rating_label(rating: u8) -> &'static str {
    match rating {
        1 => "Poor",
        2 => "Fair",
        3 => "Good",
        4 => "Very Good",
        5 => "Excellent",
        _ => "Tap to rate",
    }
}

/// Columns a rider may change on their own trip.
#[derive(Debug, Clone, Serialize)]
pub struct TripRating {
    pub rating: u8,
    pub feedback: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DriverLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub last_updated: DateTime<Utc>,
}
