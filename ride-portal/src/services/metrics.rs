use prometheus::{Encoder, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};
use std::sync::OnceLock;

/// Registry plus the collectors registered with it.
pub struct PortalMetrics {
    pub registry: Registry,
    pub http_requests_total: IntCounterVec,
    pub http_request_duration_seconds: HistogramVec,
    pub access_gate_decisions_total: IntCounterVec,
}

static METRICS: OnceLock<PortalMetrics> = OnceLock::new();

impl PortalMetrics {
    fn build() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let http_requests_total = IntCounterVec::new(
            Opts::new("http_requests_total", "Total number of HTTP requests"),
            &["method", "path", "status"],
        )?;

        let http_request_duration_seconds = HistogramVec::new(
            prometheus::HistogramOpts::new(
                "http_request_duration_seconds",
                "HTTP request duration in seconds",
            ),
            &["method", "path", "status"],
        )?;

        let access_gate_decisions_total = IntCounterVec::new(
            Opts::new(
                "access_gate_decisions_total",
                "Access gate decisions by resulting action",
            ),
            &["action"],
        )?;

        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;
        registry.register(Box::new(access_gate_decisions_total.clone()))?;

        Ok(Self {
            registry,
            http_requests_total,
            http_request_duration_seconds,
            access_gate_decisions_total,
        })
    }
}

/// Register the portal's collectors. Safe to call more than once, including
/// concurrently; the registry and its collectors are installed together.
pub fn init_metrics() -> Result<(), prometheus::Error> {
    if METRICS.get().is_some() {
        return Ok(());
    }
    let built = PortalMetrics::build()?;
    // A concurrent caller may have won; its complete set stays installed
    let _ = METRICS.set(built);
    Ok(())
}

pub fn metrics() -> Option<&'static PortalMetrics> {
    METRICS.get()
}

pub fn record_http_request(method: &str, path: &str, status: &str, seconds: f64) {
    let labels = [method, path, status];
    if let Some(m) = metrics() {
        m.http_requests_total.with_label_values(&labels).inc();
        m.http_request_duration_seconds
            .with_label_values(&labels)
            .observe(seconds);
    }
}

pub fn record_gate_decision(action: &str) {
    if let Some(m) = metrics() {
        m.access_gate_decisions_total
            .with_label_values(&[action])
            .inc();
    }
}

pub fn get_metrics() -> String {
    let Some(m) = metrics() else {
        return String::new();
    };

    let mut buffer = Vec::new();
    if let Err(e) = TextEncoder::new().encode(&m.registry.gather(), &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}
