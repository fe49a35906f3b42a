pub mod access_gate;
pub mod metrics;

pub use access_gate::access_gate;
pub use metrics::metrics_middleware;
