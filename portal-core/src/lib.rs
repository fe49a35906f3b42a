//! portal-core: Shared HTTP infrastructure for the ride portal.
pub mod error;
pub mod middleware;
pub mod observability;

pub use axum;
pub use tracing;
