//! Database migrations
//!
//! Manages the routing schema version. Each `migrate_vN` function is applied
//! at most once, in order, and the reached version is stored in
//! `schema_version`.
//!
//! Rollbacks are manual: fix the cause, repair the file if needed, then
//! restart so pending migrations run again.

use rusqlite::Connection;
use tracing::{debug, error, info};

use super::connection::DatabaseError;

/// Current schema version
pub const SCHEMA_VERSION: i32 = 2;

/// Run all pending migrations
pub fn run_migrations(conn: &Connection) -> Result<(), DatabaseError> {
    let current_version = get_schema_version(conn)?;

    if current_version >= SCHEMA_VERSION {
        debug!(version = current_version, "Database schema is up to date");
        return Ok(());
    }

    info!(
        from_version = current_version,
        to_version = SCHEMA_VERSION,
        "Running database migrations"
    );

    let steps: [(i32, &str, fn(&Connection) -> Result<(), DatabaseError>); 2] = [
        (1, "collections and access keys", migrate_v1),
        (2, "direct route keys", migrate_v2),
    ];

    for (version, name, migrate) in steps {
        if current_version >= version {
            continue;
        }
        if let Err(e) = migrate(conn) {
            error!(version, migration = name, error = %e, "Migration failed");
            return Err(e);
        }
        set_schema_version(conn, version)?;
    }

    info!(version = SCHEMA_VERSION, "Database migrations complete");
    Ok(())
}

/// Get current schema version
pub fn get_schema_version(conn: &Connection) -> Result<i32, DatabaseError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        )",
        [],
    )?;

    let version: i32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )?;

    Ok(version)
}

fn set_schema_version(conn: &Connection, version: i32) -> Result<(), DatabaseError> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute(
        "INSERT INTO schema_version (version) VALUES (?1)",
        [version],
    )?;
    Ok(())
}

/// Migration to version 1: collections, endpoints and access keys
fn migrate_v1(conn: &Connection) -> Result<(), DatabaseError> {
    debug!("Applying migration V001: collections and access keys");

    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS collections (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            description TEXT,
            is_active INTEGER NOT NULL DEFAULT 1,
            request_count INTEGER NOT NULL DEFAULT 0,
            owner_id INTEGER
        );

        -- error_codes holds a JSON array; NULL or [] means the 500/503 default
        CREATE TABLE IF NOT EXISTS endpoints (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL DEFAULT '',
            url TEXT NOT NULL,
            method TEXT,
            collection_id INTEGER NOT NULL,
            fail_rate INTEGER NOT NULL DEFAULT 0,
            min_latency INTEGER NOT NULL DEFAULT 0,
            max_latency INTEGER NOT NULL DEFAULT 0,
            error_codes TEXT,
            sandbox INTEGER NOT NULL DEFAULT 0,
            is_active INTEGER NOT NULL DEFAULT 1,
            request_count INTEGER NOT NULL DEFAULT 0,
            FOREIGN KEY (collection_id) REFERENCES collections(id) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS api_keys (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT,
            key TEXT NOT NULL UNIQUE,
            is_active INTEGER NOT NULL DEFAULT 1,
            all_collections INTEGER NOT NULL DEFAULT 0,
            request_count INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now')),
            last_used_at TEXT,
            owner_id INTEGER
        );

        CREATE TABLE IF NOT EXISTS apikey_collections (
            apikey_id INTEGER NOT NULL,
            collection_id INTEGER NOT NULL,
            PRIMARY KEY (apikey_id, collection_id),
            FOREIGN KEY (apikey_id) REFERENCES api_keys(id) ON DELETE CASCADE,
            FOREIGN KEY (collection_id) REFERENCES collections(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_endpoints_collection ON endpoints(collection_id, id);
        CREATE INDEX IF NOT EXISTS idx_apikey_collections_key ON apikey_collections(apikey_id);
        ",
    )?;

    Ok(())
}

/// Migration to version 2: direct route keys
fn migrate_v2(conn: &Connection) -> Result<(), DatabaseError> {
    debug!("Applying migration V002: direct route keys");

    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS config_api_keys (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL DEFAULT '',
            key TEXT NOT NULL UNIQUE,
            is_active INTEGER NOT NULL DEFAULT 1,
            target_url TEXT,
            fail_rate INTEGER,
            min_latency INTEGER,
            max_latency INTEGER,
            method TEXT,
            error_codes TEXT,
            created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now')),
            owner_id INTEGER NOT NULL DEFAULT 0
        );
        ",
    )?;

    Ok(())
}
