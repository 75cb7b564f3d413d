//! Infrastructure layer - Adapters for external systems
//!
//! Implements ports defined in the application layer: the SQLite
//! configuration store, the reqwest forwarder, random sources and the
//! background usage recorder. Also owns configuration loading and logging
//! setup.

pub mod adapters;
pub mod config;
pub mod persistence;
pub mod telemetry;

pub use adapters::*;
pub use config::{
    AppConfig, ChaosConfig, DatabaseConfig, Environment, ServerConfig, UpstreamConfig, UsageConfig,
};
pub use persistence::{ConnectionPool, DatabaseError, SqliteConfigStore, create_pool};
pub use telemetry::{LogFormat, TelemetryError, init_tracing};
