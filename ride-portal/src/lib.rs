pub mod config;
pub mod gate;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod startup;

use crate::config::{GateSettings, ServerSettings};
use services::{AuthGateway, ProfileStore, TripStore};
use std::sync::Arc;

/// Shared application state: hosted-backend seams plus the settings handlers
/// and the gate need at request time.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<dyn AuthGateway>,
    pub profiles: Arc<dyn ProfileStore>,
    pub trips: Arc<dyn TripStore>,
    pub gate: GateSettings,
    pub server: Arc<ServerSettings>,
}

impl AppState {
    pub fn new(
        auth: Arc<dyn AuthGateway>,
        profiles: Arc<dyn ProfileStore>,
        trips: Arc<dyn TripStore>,
        gate: GateSettings,
        server: ServerSettings,
    ) -> Self {
        Self {
            auth,
            profiles,
            trips,
            gate,
            server: Arc::new(server),
        }
    }

    /// All three seams served by one backend client.
    pub fn from_backend<B>(backend: Arc<B>, gate: GateSettings, server: ServerSettings) -> Self
    where
        B: AuthGateway + ProfileStore + TripStore + 'static,
    {
        Self::new(backend.clone(), backend.clone(), backend, gate, server)
    }
}
