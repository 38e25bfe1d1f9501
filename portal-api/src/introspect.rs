//! Live table schema introspection
//!
//! One `PRAGMA table_info` round trip per request; nothing is cached, so a
//! descriptor is only valid for the request that fetched it. The table name
//! always comes from the [`Table`](crate::tables::Table) allow-list, never
//! from raw client input.

use sqlx::pool::PoolConnection;
use sqlx::{Row, Sqlite};
use tracing::debug;

use crate::error::{ApiError, Result};
use crate::schema::{ColumnDescriptor, ColumnKind};
use crate::tables::Table;

/// Fetch the ordered column list for `table`.
///
/// An empty introspection result means the table does not exist in the
/// database (a table cannot have zero columns), so it surfaces as a schema
/// error rather than an empty descriptor.
pub async fn describe_table(
    conn: &mut PoolConnection<Sqlite>,
    table: Table,
) -> Result<Vec<ColumnDescriptor>> {
    let query = format!("PRAGMA table_info(\"{}\")", table.name());
    let rows = sqlx::query(&query).fetch_all(&mut **conn).await?;

    if rows.is_empty() {
        return Err(ApiError::Schema(table.name().to_string()));
    }

    let mut columns = Vec::with_capacity(rows.len());
    for row in rows {
        // PRAGMA table_info returns: cid, name, type, notnull, dflt_value, pk
        let name: String = row.try_get("name")?;
        let declared_type: String = row.try_get("type")?;
        let not_null: i32 = row.try_get("notnull")?;

        columns.push(ColumnDescriptor {
            name,
            kind: classify(&declared_type),
            nullable: not_null == 0,
        });
    }

    debug!(table = table.name(), columns = columns.len(), "described table");
    Ok(columns)
}

/// Map a declared SQLite column type onto a coercion kind.
fn classify(declared_type: &str) -> ColumnKind {
    let upper = declared_type.to_uppercase();

    // Order matters: DATETIME contains both "DATE" and "INT"-free matches,
    // and BIGINT contains "INT".
    if upper.contains("DATETIME") || upper.contains("TIMESTAMP") {
        ColumnKind::DateTime
    } else if upper.contains("DATE") {
        ColumnKind::Date
    } else if upper.contains("BIGINT") {
        ColumnKind::BigInt
    } else if upper.contains("INT") {
        ColumnKind::Integer
    } else if upper.contains("CHAR") || upper.contains("TEXT") || upper.contains("CLOB") {
        ColumnKind::Text
    } else {
        ColumnKind::Other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declared_types_classify_by_affinity() {
        assert_eq!(classify("INTEGER"), ColumnKind::Integer);
        assert_eq!(classify("int"), ColumnKind::Integer);
        assert_eq!(classify("BIGINT"), ColumnKind::BigInt);
        assert_eq!(classify("DATE"), ColumnKind::Date);
        assert_eq!(classify("DATETIME"), ColumnKind::DateTime);
        assert_eq!(classify("TIMESTAMP"), ColumnKind::DateTime);
        assert_eq!(classify("TEXT"), ColumnKind::Text);
        assert_eq!(classify("VARCHAR(255)"), ColumnKind::Text);
        assert_eq!(classify("REAL"), ColumnKind::Other);
    }

    #[test]
    fn date_like_set_is_exactly_date_and_datetime() {
        assert!(ColumnKind::Date.is_date_like());
        assert!(ColumnKind::DateTime.is_date_like());
        assert!(!ColumnKind::Integer.is_date_like());
        assert!(!ColumnKind::Text.is_date_like());
    }
}
