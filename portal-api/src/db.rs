//! Connection provider
//!
//! Wraps the SQLite pool as an explicitly owned object that the server
//! creates at startup and hands into the router state. Checked-out
//! connections are health-checked on acquire; dead handles are discarded and
//! rebuilt by the pool. A connection goes back to the pool when its guard
//! drops, so release is guaranteed on error paths too.

use serde_json::Value;
use sqlx::pool::PoolConnection;
use sqlx::sqlite::{SqlitePoolOptions, SqliteRow};
use sqlx::{Column, Row, Sqlite, SqlitePool, TypeInfo, ValueRef};
use tracing::{debug, error};

use crate::error::{ApiError, Result};

/// Owned handle to the portal database.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open a bounded pool against `url`.
    ///
    /// Acquire waits (does not reject) when the pool is exhausted, and pings
    /// each handle before handing it out so a broken connection is replaced
    /// rather than surfaced to the request.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .test_before_acquire(true)
            .connect(url)
            .await
            .map_err(|e| {
                error!("Failed to connect to database at {url}: {e}");
                ApiError::Connection(e.to_string())
            })?;

        debug!("Connected to database at {url}");
        Ok(Self { pool })
    }

    /// Check out a connection for one request's sequence of round trips.
    pub async fn acquire(&self) -> Result<PoolConnection<Sqlite>> {
        self.pool.acquire().await.map_err(|e| {
            error!("Failed to acquire database connection: {e}");
            ApiError::Connection(e.to_string())
        })
    }

    /// Trivial round trip to verify the database is reachable.
    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| ApiError::Connection(e.to_string()))?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the pool. Further acquires fail with a connection error.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Convert a SQLite row to a JSON object keyed by column name.
///
/// SQLite reports type affinities rather than strict types, so extraction
/// goes by the reported affinity with a fallback chain for anything odd.
pub fn row_to_json(row: &SqliteRow) -> Result<Value> {
    let mut map = serde_json::Map::new();

    for column in row.columns() {
        let value = extract_column_value(row, column)?;
        map.insert(column.name().to_string(), value);
    }

    Ok(Value::Object(map))
}

fn extract_column_value(row: &SqliteRow, column: &sqlx::sqlite::SqliteColumn) -> Result<Value> {
    let name = column.name();

    if row
        .try_get_raw(name)
        .map_err(|e| ApiError::Query {
            message: e.to_string(),
            code: None,
        })?
        .is_null()
    {
        return Ok(Value::Null);
    }

    match column.type_info().name() {
        "INTEGER" | "BIGINT" => {
            if let Ok(value) = row.try_get::<i64, _>(name) {
                return Ok(Value::Number(value.into()));
            }
        }
        "REAL" | "FLOAT" | "DOUBLE" => {
            if let Ok(value) = row.try_get::<f64, _>(name) {
                if let Some(number) = serde_json::Number::from_f64(value) {
                    return Ok(Value::Number(number));
                }
            }
        }
        "BOOLEAN" | "BOOL" => {
            if let Ok(value) = row.try_get::<bool, _>(name) {
                return Ok(Value::Bool(value));
            }
        }
        // Dates and datetimes are stored and formatted as text.
        _ => {
            if let Ok(value) = row.try_get::<String, _>(name) {
                return Ok(Value::String(value));
            }
        }
    }

    // Fallback: try common types in order.
    if let Ok(value) = row.try_get::<i64, _>(name) {
        return Ok(Value::Number(value.into()));
    }
    if let Ok(value) = row.try_get::<f64, _>(name) {
        if let Some(number) = serde_json::Number::from_f64(value) {
            return Ok(Value::Number(number));
        }
    }
    if let Ok(value) = row.try_get::<String, _>(name) {
        return Ok(Value::String(value));
    }
    if let Ok(value) = row.try_get::<Vec<u8>, _>(name) {
        return Ok(Value::String(format!("[BLOB: {} bytes]", value.len())));
    }

    Ok(Value::Null)
}
