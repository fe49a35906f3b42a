use dotenvy::dotenv;
use portal_core::observability::init_tracing;
use ride_portal::config::get_configuration;
use ride_portal::services::{metrics::init_metrics, BackendClient};
use ride_portal::startup::build_router;
use ride_portal::AppState;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let configuration = get_configuration().map_err(|e| {
        eprintln!("Failed to read configuration: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    init_tracing(
        "ride-portal",
        &configuration.telemetry.log_level,
        configuration.telemetry.otlp_endpoint.as_deref(),
    );

    init_metrics().map_err(|e| anyhow::anyhow!("Failed to register metrics: {}", e))?;

    let backend = Arc::new(BackendClient::new(configuration.backend.clone()));
    info!(backend_url = %backend.base_url(), "Hosted backend configured");

    let address = format!(
        "{}:{}",
        configuration.server.host, configuration.server.port
    );
    let state = AppState::from_backend(backend, configuration.gate, configuration.server);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&address).await.map_err(|e| {
        tracing::error!("Failed to bind TCP listener to {}: {}", address, e);
        anyhow::anyhow!("Failed to bind to address {}: {}", address, e)
    })?;

    info!("Starting ride-portal on {}", address);
    axum::serve(listener, app).await.map_err(|e| {
        tracing::error!("Server error: {}", e);
        anyhow::anyhow!("Server error: {}", e)
    })?;

    Ok(())
}
