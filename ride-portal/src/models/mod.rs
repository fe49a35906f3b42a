pub mod profile;
pub mod session;
pub mod trip;
pub mod user;

pub use profile::Profile;
pub use session::{AuthSession, GrantUser, RoleClaim, TokenGrant, CLIENT_ROLE};
pub use trip::{rating_label, DriverLocation, Trip, TripRating, TripStatus};
pub use user::AuthUser;
