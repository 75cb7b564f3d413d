//! Application configuration
//!
//! Split into focused sub-modules:
//! - `server`: HTTP server and logging settings
//! - `database`: SQLite routing store settings
//! - `upstream`: Forwarding client timeouts
//! - `usage`: Usage counters and chaos randomness
//!
//! Sources are layered: built-in defaults, then an optional `config.toml`,
//! then `LATENCY_POISON_`-prefixed environment variables (nested keys use
//! `__`, e.g. `LATENCY_POISON_SERVER__PORT`). The bare `PORT` and
//! `DATABASE_PATH` variables win over everything else.

mod database;
mod server;
mod upstream;
mod usage;

use std::fmt;

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use database::{DatabaseConfig, IN_MEMORY_PATH};
pub use server::ServerConfig;
pub use upstream::UpstreamConfig;
pub use usage::{ChaosConfig, UsageConfig};

/// Prefix of configuration environment variables
pub const ENV_PREFIX: &str = "LATENCY_POISON";

/// Legacy variable overriding `server.port`
pub const LEGACY_PORT_VAR: &str = "PORT";

/// Legacy variable overriding `database.path`
pub const LEGACY_DATABASE_PATH_VAR: &str = "DATABASE_PATH";

/// Shared default for boolean `true` fields across config structs
pub(crate) const fn default_true() -> bool {
    true
}

/// Application environment (development or production)
///
/// Production hides internal error details from API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            _ => Err(format!(
                "Invalid environment: {s}. Use 'development' or 'production'"
            )),
        }
    }
}

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (development or production)
    #[serde(default)]
    pub environment: Option<Environment>,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub upstream: UpstreamConfig,

    #[serde(default)]
    pub usage: UsageConfig,

    #[serde(default)]
    pub chaos: ChaosConfig,
}

impl AppConfig {
    /// Load configuration from defaults, optional file and environment
    pub fn load() -> Result<Self, ConfigError> {
        let builder = Self::defaults()?
            // Load from file if exists
            .add_source(config::File::with_name("config").required(false))
            // Override with environment variables (e.g., LATENCY_POISON_SERVER__PORT)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let builder = apply_legacy_overrides(
            builder,
            std::env::var(LEGACY_PORT_VAR).ok(),
            std::env::var(LEGACY_DATABASE_PATH_VAR).ok(),
        )?;

        builder.build()?.try_deserialize()
    }

    /// Builder seeded with the built-in defaults
    pub fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("database.path", "latency-poison.db")
    }

    /// Effective environment, development when unset
    pub fn environment(&self) -> Environment {
        self.environment.unwrap_or_default()
    }
}

/// Apply the bare `PORT` / `DATABASE_PATH` variables on top of every source
pub fn apply_legacy_overrides(
    mut builder: ConfigBuilder<DefaultState>,
    port: Option<String>,
    database_path: Option<String>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    if let Some(port) = port.filter(|p| !p.trim().is_empty()) {
        debug!(port = %port, "Applying legacy PORT override");
        builder = builder.set_override("server.port", port.trim().to_string())?;
    }
    if let Some(path) = database_path.filter(|p| !p.trim().is_empty()) {
        debug!(path = %path, "Applying legacy DATABASE_PATH override");
        builder = builder.set_override("database.path", path)?;
    }
    Ok(builder)
}
