pub mod backend;
pub mod metrics;
pub mod stores;
pub mod tracking;

pub use backend::BackendClient;
pub use stores::{AuthGateway, BackendError, ProfileStore, SignUpOutcome, TripStore};
