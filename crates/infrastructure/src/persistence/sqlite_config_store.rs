//! SQLite routing configuration store
//!
//! Implements the `ConfigStore` port on top of the r2d2 pool. Queries run
//! on the blocking thread pool; rows are normalised into domain types after
//! the connection is released.

use std::sync::Arc;

use application::{
    error::ApplicationError,
    ports::{ConfigStore, UsageEvent},
};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use domain::{
    AccessKey, AccessKeyId, ChaosPolicy, Collection, CollectionId, DirectRouteKey,
    DirectRouteKeyId, Endpoint, EndpointId, FailureRate, KeyScope, LatencyRange, MethodFilter,
    OwnerId, UrlPattern, is_valid_status,
};
use rusqlite::{OptionalExtension, Row, params};
use tokio::task;
use tracing::{debug, instrument, warn};

use super::connection::{ConnectionPool, PooledConn};

/// SQLite-backed routing configuration
#[derive(Debug, Clone)]
pub struct SqliteConfigStore {
    pool: Arc<ConnectionPool>,
}

impl SqliteConfigStore {
    /// Create a new store over a connection pool
    #[must_use]
    pub const fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }

    /// Run `f` with a pooled connection on the blocking thread pool
    async fn with_conn<T, F>(&self, f: F) -> Result<T, ApplicationError>
    where
        T: Send + 'static,
        F: FnOnce(&PooledConn) -> Result<T, rusqlite::Error> + Send + 'static,
    {
        let pool = Arc::clone(&self.pool);
        task::spawn_blocking(move || {
            let conn = pool
                .get()
                .map_err(|e| ApplicationError::Internal(e.to_string()))?;
            f(&conn).map_err(|e| ApplicationError::Internal(e.to_string()))
        })
        .await
        .map_err(|e| ApplicationError::Internal(e.to_string()))?
    }
}

/// Chaos columns shared by direct keys and endpoints, as stored
#[derive(Debug)]
struct StoredPolicy {
    fail_rate: i64,
    min_latency: i64,
    max_latency: i64,
    error_codes: Option<String>,
}

impl StoredPolicy {
    fn into_policy(self) -> Result<ChaosPolicy, ApplicationError> {
        let latency = LatencyRange::from_stored(self.min_latency, self.max_latency).map_err(|e| {
            ApplicationError::Internal(format!("Stored latency range is invalid: {e}"))
        })?;
        let codes = parse_stored_codes(self.error_codes.as_deref());

        ChaosPolicy::new(FailureRate::from_percent(self.fail_rate), latency, codes)
            .map(ChaosPolicy::with_default_error_codes)
            .map_err(|e| ApplicationError::Internal(e.to_string()))
    }
}

/// Decode a stored JSON code list, dropping codes that are not HTTP statuses
fn parse_stored_codes(raw: Option<&str>) -> Vec<u16> {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return Vec::new();
    };

    let values: Vec<i64> = match serde_json::from_str(raw) {
        Ok(values) => values,
        Err(e) => {
            warn!(raw = %raw, error = %e, "Unparsable stored error codes, using defaults");
            return Vec::new();
        },
    };

    values
        .into_iter()
        .filter_map(|value| {
            let code = u16::try_from(value).ok().filter(|c| is_valid_status(*c));
            if code.is_none() {
                warn!(code = value, "Dropping stored error code outside 100..=999");
            }
            code
        })
        .collect()
}

fn parse_method(raw: Option<&str>) -> Result<MethodFilter, ApplicationError> {
    MethodFilter::parse(raw.unwrap_or_default())
        .map_err(|e| ApplicationError::Internal(format!("Stored method is invalid: {e}")))
}

/// Parse a stored timestamp, RFC 3339 or SQLite's `YYYY-MM-DD HH:MM:SS[.f]`
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

fn non_negative(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

struct DirectKeyRow {
    id: i64,
    name: String,
    key: String,
    active: bool,
    target_url: String,
    method: Option<String>,
    policy: StoredPolicy,
    owner_id: i64,
}

fn row_to_direct_key(row: &Row<'_>) -> rusqlite::Result<DirectKeyRow> {
    Ok(DirectKeyRow {
        id: row.get(0)?,
        name: row.get(1)?,
        key: row.get(2)?,
        active: row.get(3)?,
        target_url: row.get(4)?,
        method: row.get(5)?,
        policy: StoredPolicy {
            fail_rate: row.get(6)?,
            min_latency: row.get(7)?,
            max_latency: row.get(8)?,
            error_codes: row.get(9)?,
        },
        owner_id: row.get(10)?,
    })
}

impl DirectKeyRow {
    fn into_domain(self) -> Result<DirectRouteKey, ApplicationError> {
        Ok(DirectRouteKey {
            id: DirectRouteKeyId::new(self.id),
            name: self.name,
            key: self.key,
            active: self.active,
            target_url: self.target_url,
            method: parse_method(self.method.as_deref())?,
            policy: self.policy.into_policy()?,
            owner_id: OwnerId::new(self.owner_id),
        })
    }
}

struct AccessKeyRow {
    id: i64,
    key: String,
    active: bool,
    all_collections: bool,
    request_count: i64,
    created_at: String,
    last_used_at: Option<String>,
    collections: Vec<i64>,
}

impl AccessKeyRow {
    fn into_domain(self) -> AccessKey {
        let scope = if self.all_collections {
            KeyScope::AllCollections
        } else {
            KeyScope::explicit(self.collections.into_iter().map(CollectionId::new))
        };
        let created_at = parse_timestamp(&self.created_at).unwrap_or_else(|| {
            warn!(key_id = self.id, raw = %self.created_at, "Unparsable created_at");
            DateTime::<Utc>::default()
        });

        AccessKey {
            id: AccessKeyId::new(self.id),
            key: self.key,
            active: self.active,
            scope,
            request_count: non_negative(self.request_count),
            created_at,
            last_used_at: self.last_used_at.as_deref().and_then(parse_timestamp),
        }
    }
}

struct EndpointRow {
    id: i64,
    name: String,
    url: String,
    method: Option<String>,
    collection_id: i64,
    policy: StoredPolicy,
    sandbox: bool,
    active: bool,
    request_count: i64,
}

fn row_to_endpoint(row: &Row<'_>) -> rusqlite::Result<EndpointRow> {
    Ok(EndpointRow {
        id: row.get(0)?,
        name: row.get(1)?,
        url: row.get(2)?,
        method: row.get(3)?,
        collection_id: row.get(4)?,
        policy: StoredPolicy {
            fail_rate: row.get(5)?,
            min_latency: row.get(6)?,
            max_latency: row.get(7)?,
            error_codes: row.get(8)?,
        },
        sandbox: row.get(9)?,
        active: row.get(10)?,
        request_count: row.get(11)?,
    })
}

impl EndpointRow {
    fn into_domain(self) -> Result<Endpoint, ApplicationError> {
        let id = self.id;
        let policy = self.policy.into_policy().inspect_err(|e| {
            warn!(endpoint_id = id, error = %e, "Skipping endpoint with invalid chaos settings");
        })?;
        let method = parse_method(self.method.as_deref()).inspect_err(|e| {
            warn!(endpoint_id = id, error = %e, "Skipping endpoint with invalid method");
        })?;

        Ok(Endpoint {
            id: EndpointId::new(id),
            name: self.name,
            url_pattern: UrlPattern::new(self.url),
            method,
            collection_id: CollectionId::new(self.collection_id),
            policy,
            sandbox: self.sandbox,
            active: self.active,
            request_count: non_negative(self.request_count),
        })
    }
}

#[async_trait]
impl ConfigStore for SqliteConfigStore {
    #[instrument(skip(self, key))]
    async fn find_direct_key(&self, key: &str) -> Result<Option<DirectRouteKey>, ApplicationError> {
        let key = key.to_string();

        let row = self
            .with_conn(move |conn| {
                conn.query_row(
                    "SELECT id, name, key, is_active, COALESCE(target_url, ''), method,
                            COALESCE(fail_rate, 0), COALESCE(min_latency, 0),
                            COALESCE(max_latency, 0), error_codes, owner_id
                     FROM config_api_keys
                     WHERE key = ?1 AND is_active = 1",
                    [&key],
                    row_to_direct_key,
                )
                .optional()
            })
            .await?;

        row.map(DirectKeyRow::into_domain).transpose()
    }

    #[instrument(skip(self, key))]
    async fn find_access_key(&self, key: &str) -> Result<Option<AccessKey>, ApplicationError> {
        let key = key.to_string();

        let row = self
            .with_conn(move |conn| {
                let Some(mut row) = conn
                    .query_row(
                        "SELECT id, key, is_active, all_collections, request_count,
                                created_at, last_used_at
                         FROM api_keys WHERE key = ?1",
                        [&key],
                        |row| {
                            Ok(AccessKeyRow {
                                id: row.get(0)?,
                                key: row.get(1)?,
                                active: row.get(2)?,
                                all_collections: row.get(3)?,
                                request_count: row.get(4)?,
                                created_at: row.get(5)?,
                                last_used_at: row.get(6)?,
                                collections: Vec::new(),
                            })
                        },
                    )
                    .optional()?
                else {
                    return Ok(None);
                };

                if !row.all_collections {
                    let mut stmt = conn.prepare(
                        "SELECT collection_id FROM apikey_collections
                         WHERE apikey_id = ?1 ORDER BY collection_id",
                    )?;
                    row.collections = stmt
                        .query_map([row.id], |r| r.get(0))?
                        .collect::<Result<_, _>>()?;
                }

                Ok(Some(row))
            })
            .await?;

        Ok(row.map(AccessKeyRow::into_domain))
    }

    #[instrument(skip(self), fields(collection_id = %id))]
    async fn find_collection(
        &self,
        id: CollectionId,
    ) -> Result<Option<Collection>, ApplicationError> {
        self.with_conn(move |conn| {
            conn.query_row(
                "SELECT id, name, is_active, request_count, COALESCE(owner_id, 0)
                 FROM collections WHERE id = ?1",
                [id.as_i64()],
                |row| {
                    Ok(Collection {
                        id: CollectionId::new(row.get(0)?),
                        name: row.get(1)?,
                        active: row.get(2)?,
                        request_count: non_negative(row.get(3)?),
                        owner_id: OwnerId::new(row.get(4)?),
                    })
                },
            )
            .optional()
        })
        .await
    }

    #[instrument(skip(self), fields(collection_id = %collection))]
    async fn list_endpoints(
        &self,
        collection: CollectionId,
    ) -> Result<Vec<Endpoint>, ApplicationError> {
        let rows = self
            .with_conn(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, name, url, method, collection_id,
                            fail_rate, min_latency, max_latency, error_codes,
                            sandbox, is_active, request_count
                     FROM endpoints
                     WHERE collection_id = ?1
                     ORDER BY id ASC",
                )?;
                stmt.query_map([collection.as_i64()], row_to_endpoint)?
                    .collect::<Result<Vec<_>, _>>()
            })
            .await?;

        debug!(count = rows.len(), "Loaded endpoints");

        // Invalid rows are skipped; into_domain logs why
        Ok(rows
            .into_iter()
            .filter_map(|row| row.into_domain().ok())
            .collect())
    }

    #[instrument(skip(self, event), fields(endpoint_id = %event.endpoint_id))]
    async fn record_usage(&self, event: &UsageEvent) -> Result<(), ApplicationError> {
        let event = *event;

        self.with_conn(move |conn| {
            let tx = conn.unchecked_transaction()?;
            tx.execute(
                "UPDATE api_keys
                 SET request_count = request_count + 1, last_used_at = ?2
                 WHERE id = ?1",
                params![event.access_key_id.as_i64(), event.at.to_rfc3339()],
            )?;
            tx.execute(
                "UPDATE collections SET request_count = request_count + 1 WHERE id = ?1",
                [event.collection_id.as_i64()],
            )?;
            tx.execute(
                "UPDATE endpoints SET request_count = request_count + 1 WHERE id = ?1",
                [event.endpoint_id.as_i64()],
            )?;
            tx.commit()
        })
        .await
    }

    #[instrument(skip(self))]
    async fn is_available(&self) -> bool {
        let result = self
            .with_conn(|conn| conn.query_row("SELECT 1", [], |row| row.get::<_, i32>(0)))
            .await;

        match result {
            Ok(_) => true,
            Err(e) => {
                warn!(error = %e, "Database health check failed");
                false
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_codes_default_to_empty() {
        assert!(parse_stored_codes(None).is_empty());
        assert!(parse_stored_codes(Some("")).is_empty());
        assert!(parse_stored_codes(Some("[]")).is_empty());
        assert!(parse_stored_codes(Some("not json")).is_empty());
    }

    #[test]
    fn stored_codes_drop_invalid_statuses() {
        assert_eq!(
            parse_stored_codes(Some("[502, 42, 70000, -1, 503]")),
            vec![502, 503]
        );
    }

    #[test]
    fn stored_policy_normalises_values() {
        let policy = StoredPolicy {
            fail_rate: 150,
            min_latency: -20,
            max_latency: 100,
            error_codes: None,
        }
        .into_policy()
        .unwrap();

        assert!(policy.failure_rate().is_certain());
        assert_eq!(policy.latency(), LatencyRange::new(0, 100).unwrap());
        assert_eq!(policy.error_codes(), &[500, 503]);
    }

    #[test]
    fn stored_policy_rejects_inverted_latency() {
        let result = StoredPolicy {
            fail_rate: 0,
            min_latency: 300,
            max_latency: 100,
            error_codes: None,
        }
        .into_policy();
        assert!(matches!(result, Err(ApplicationError::Internal(_))));
    }

    #[test]
    fn timestamps_accept_both_formats() {
        assert!(parse_timestamp("2024-05-01T10:00:00Z").is_some());
        assert!(parse_timestamp("2024-05-01 10:00:00.123456").is_some());
        assert!(parse_timestamp("2024-05-01 10:00:00").is_some());
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn missing_method_means_any() {
        assert_eq!(parse_method(None).unwrap(), MethodFilter::Any);
        assert_eq!(
            parse_method(Some("post")).unwrap(),
            MethodFilter::Only("POST".to_string())
        );
    }
}
