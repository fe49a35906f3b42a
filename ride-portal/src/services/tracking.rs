use chrono::Utc;
use rand::Rng;

use crate::models::DriverLocation;

const BASE_LATITUDE: f64 = 37.7749;
const BASE_LONGITUDE: f64 = -122.4194;
const JITTER_DEGREES: f64 = 0.005;

/// Simulated driver position near downtown San Francisco.
// TODO: replace with the driver's reported position once the dispatch feed exists.
pub fn simulate_driver_location<R: Rng + ?Sized>(rng: &mut R) -> DriverLocation {
    DriverLocation {
        latitude: BASE_LATITUDE + rng.gen_range(-JITTER_DEGREES..JITTER_DEGREES),
        longitude: BASE_LONGITUDE + rng.gen_range(-JITTER_DEGREES..JITTER_DEGREES),
        last_updated: Utc::now(),
    }
}
