use secrecy::Secret;
use serde::Deserialize;

#[derive(Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub backend: BackendSettings,
    #[serde(default)]
    pub gate: GateSettings,
    #[serde(default)]
    pub telemetry: TelemetrySettings,
}

#[derive(Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Browser-facing origin, used to build links in outgoing emails.
    pub public_url: String,
    #[serde(default)]
    pub secure_cookies: bool,
    #[serde(default = "default_session_inactivity_hours")]
    pub session_inactivity_hours: i64,
}

fn default_session_inactivity_hours() -> i64 {
    24
}

#[derive(Deserialize, Clone)]
pub struct BackendSettings {
    /// Base URL of the hosted backend; `/auth/v1` and `/rest/v1` hang off it.
    pub url: String,
    /// Public (anon) API key sent as `apikey` on every call.
    pub anon_key: Secret<String>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct GateSettings {
    /// Sessions this close to expiry are refreshed before the gate decides.
    #[serde(default = "default_refresh_margin_secs")]
    pub refresh_margin_secs: i64,
}

impl Default for GateSettings {
    fn default() -> Self {
        Self {
            refresh_margin_secs: default_refresh_margin_secs(),
        }
    }
}

fn default_refresh_margin_secs() -> i64 {
    60
}

#[derive(Deserialize, Clone, Debug)]
pub struct TelemetrySettings {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            otlp_endpoint: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path =
        std::env::current_dir().map_err(|e| config::ConfigError::Foreign(Box::new(e)))?;

    // Allow running from the workspace root or from inside the crate
    let configuration_directory = if base_path.ends_with("ride-portal") {
        base_path.join("config")
    } else {
        base_path.join("ride-portal").join("config")
    };

    let settings = config::Config::builder()
        .add_source(config::File::from(configuration_directory.join("base.yaml")).required(true))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}
