//! Persistence module
//!
//! SQLite-based storage for the routing configuration.

pub mod connection;
pub mod migrations;
pub mod sqlite_config_store;

pub use connection::{ConnectionPool, DatabaseError, PooledConn, create_pool};
pub use sqlite_config_store::SqliteConfigStore;
