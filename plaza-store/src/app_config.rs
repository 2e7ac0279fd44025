use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub booking: BookingRules,
    pub catalog: CatalogConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

/// Business policy for the reservation core. Lives in configuration so
/// operators can tune TTLs without a rebuild.
#[derive(Debug, Deserialize, Clone)]
pub struct BookingRules {
    /// How long a hold survives without confirmation.
    pub hold_ttl_seconds: u64,
    /// Per-reservation cap on requested units.
    pub max_units_per_reservation: u32,
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_seconds: u64,
}

fn default_sweep_interval() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct CatalogConfig {
    /// Path to the JSON inventory seed.
    pub seed_path: String,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Base configuration, always present
            .add_source(config::File::with_name("config/default"))
            // Per-environment overrides, optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Machine-local overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Environment variables, e.g. PLAZA__SERVER__PORT=9000
            .add_source(config::Environment::with_prefix("PLAZA").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
