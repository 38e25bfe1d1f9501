//! Parameterized statement building
//!
//! Converts a JSON payload plus an introspected schema into SQL with typed
//! bound parameters. Values are never concatenated into statement text; the
//! only interpolated identifiers are allow-listed table names and column
//! names that came out of introspection or the hardcoded id-column map.
//!
//! Payload rules, in order:
//! 1. Fields absent from the schema are rejected with a validation error
//!    naming them.
//! 2. The primary-key field is dropped (auto-generated by the database).
//! 3. Remaining values are coerced by declared column kind.
//! 4. `CreatedAt`/`UpdatedAt` are stamped with the current server time,
//!    overriding anything the caller sent for those fields.

use chrono::{NaiveDate, NaiveDateTime, Utc};
use serde_json::{Map, Value};
use sqlx::query::Query;
use sqlx::sqlite::SqliteArguments;
use sqlx::Sqlite;

use crate::error::{ApiError, Result};
use crate::schema::{ColumnDescriptor, ColumnKind};
use crate::tables::Table;

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A payload value after schema-driven coercion, ready to bind.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundValue {
    Integer(i64),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Text(String),
    Null,
}

/// Attach coerced values to a query in order.
pub fn bind_values<'q>(
    mut query: Query<'q, Sqlite, SqliteArguments<'q>>,
    values: &'q [BoundValue],
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    for value in values {
        query = match value {
            BoundValue::Integer(n) => query.bind(*n),
            BoundValue::Date(d) => query.bind(d.format(DATE_FORMAT).to_string()),
            BoundValue::DateTime(dt) => query.bind(dt.format(DATETIME_FORMAT).to_string()),
            BoundValue::Text(s) => query.bind(s.as_str()),
            BoundValue::Null => query.bind(Option::<String>::None),
        };
    }
    query
}

/// Coerce one raw payload value by its column's declared kind.
pub fn coerce_value(column: &ColumnDescriptor, raw: &Value) -> Result<BoundValue> {
    if raw.is_null() {
        return Ok(BoundValue::Null);
    }

    match column.kind {
        ColumnKind::Integer | ColumnKind::BigInt => match raw {
            Value::Number(n) => n.as_i64().map(BoundValue::Integer).ok_or_else(|| {
                invalid_field("integer", &column.name)
            }),
            Value::String(s) => s
                .trim()
                .parse::<i64>()
                .map(BoundValue::Integer)
                .map_err(|_| invalid_field("integer", &column.name)),
            _ => Err(invalid_field("integer", &column.name)),
        },
        ColumnKind::Date => match raw {
            Value::String(s) => parse_date(s)
                .map(BoundValue::Date)
                .ok_or_else(|| invalid_field("date", &column.name)),
            _ => Err(invalid_field("date", &column.name)),
        },
        ColumnKind::DateTime => match raw {
            Value::String(s) => parse_datetime(s)
                .map(BoundValue::DateTime)
                .ok_or_else(|| invalid_field("datetime", &column.name)),
            _ => Err(invalid_field("datetime", &column.name)),
        },
        // Text and unrecognized kinds pass through as unbounded text.
        ColumnKind::Text | ColumnKind::Other => Ok(BoundValue::Text(match raw {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })),
    }
}

fn invalid_field(expected: &str, field: &str) -> ApiError {
    ApiError::Validation {
        message: format!("Invalid {expected} value for field {field}"),
        fields: vec![field.to_string()],
    }
}

fn parse_date(input: &str) -> Option<NaiveDate> {
    let trimmed = input.trim();
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .ok()
        .or_else(|| parse_datetime(trimmed).map(|dt| dt.date()))
}

fn parse_datetime(input: &str) -> Option<NaiveDateTime> {
    let trimmed = input.trim();
    NaiveDateTime::parse_from_str(trimmed, DATETIME_FORMAT)
        .ok()
        .or_else(|| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S").ok())
        .or_else(|| {
            NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Current server time formatted for the audit columns.
fn timestamp_now() -> BoundValue {
    BoundValue::DateTime(Utc::now().naive_utc())
}

/// Quote an identifier. Names are trusted (allow-list or introspection), so
/// this mainly keeps mixed-case column names intact.
fn quote_ident(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}

/// Validate and coerce a payload against the live schema.
///
/// Returns the surviving `(column, value)` pairs without the audit stamps.
fn prepare_fields(
    table: Table,
    payload: &Map<String, Value>,
    schema: &[ColumnDescriptor],
) -> Result<Vec<(String, BoundValue)>> {
    let unknown: Vec<String> = payload
        .keys()
        .filter(|key| !schema.iter().any(|col| col.name == **key))
        .cloned()
        .collect();
    if !unknown.is_empty() {
        return Err(ApiError::Validation {
            message: format!("Unknown fields for table {}: {}", table, unknown.join(", ")),
            fields: unknown,
        });
    }

    let mut fields = Vec::with_capacity(payload.len());
    for (key, raw) in payload {
        // The id is auto-generated; the audit stamps are server-controlled.
        if key == table.id_column() || key == "CreatedAt" || key == "UpdatedAt" {
            continue;
        }
        let column = schema
            .iter()
            .find(|col| &col.name == key)
            .ok_or_else(|| ApiError::Validation {
                message: format!("Unknown field for table {table}: {key}"),
                fields: vec![key.clone()],
            })?;
        fields.push((key.clone(), coerce_value(column, raw)?));
    }

    Ok(fields)
}

/// Build an INSERT with identity retrieval atomic with the write.
pub fn build_insert(
    table: Table,
    payload: &Map<String, Value>,
    schema: &[ColumnDescriptor],
) -> Result<(String, Vec<BoundValue>)> {
    let mut fields = prepare_fields(table, payload, schema)?;
    fields.push(("CreatedAt".to_string(), timestamp_now()));
    fields.push(("UpdatedAt".to_string(), timestamp_now()));

    let columns: Vec<String> = fields.iter().map(|(name, _)| quote_ident(name)).collect();
    let placeholders: Vec<&str> = fields.iter().map(|_| "?").collect();

    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING *",
        quote_ident(table.name()),
        columns.join(", "),
        placeholders.join(", "),
    );
    let values = fields.into_iter().map(|(_, value)| value).collect();

    Ok((sql, values))
}

/// Build an UPDATE over every payload field present in schema except the id.
///
/// The trailing bound value is the row id. An empty RETURNING set means the
/// row did not exist; callers map that to a not-found error off the write's
/// own result rather than a separate read-back.
pub fn build_update(
    table: Table,
    id: i64,
    payload: &Map<String, Value>,
    schema: &[ColumnDescriptor],
) -> Result<(String, Vec<BoundValue>)> {
    let mut fields = prepare_fields(table, payload, schema)?;
    fields.push(("UpdatedAt".to_string(), timestamp_now()));

    let assignments: Vec<String> = fields
        .iter()
        .map(|(name, _)| format!("{} = ?", quote_ident(name)))
        .collect();

    let sql = format!(
        "UPDATE {} SET {} WHERE {} = ? RETURNING *",
        quote_ident(table.name()),
        assignments.join(", "),
        quote_ident(table.id_column()),
    );

    let mut values: Vec<BoundValue> = fields.into_iter().map(|(_, value)| value).collect();
    values.push(BoundValue::Integer(id));

    Ok((sql, values))
}

/// Build the full-table SELECT, newest first.
///
/// Date-like columns are display-formatted at the database layer so the
/// client sees `YYYY-MM-DD` regardless of storage representation.
pub fn build_select_all(table: Table, schema: &[ColumnDescriptor]) -> String {
    // The ORDER BY must be table-qualified: a bare "CreatedAt" would resolve
    // to the date-truncated output alias and tie all same-day rows.
    let order = if schema.iter().any(|col| col.name == "CreatedAt") {
        format!(
            " ORDER BY {}.\"CreatedAt\" DESC",
            quote_ident(table.name())
        )
    } else {
        String::new()
    };

    format!(
        "SELECT {} FROM {}{}",
        select_columns(schema),
        quote_ident(table.name()),
        order,
    )
}

/// Build the single-row SELECT by primary key. Binds one value: the id.
pub fn build_select_one(table: Table, schema: &[ColumnDescriptor]) -> String {
    format!(
        "SELECT {} FROM {} WHERE {} = ?",
        select_columns(schema),
        quote_ident(table.name()),
        quote_ident(table.id_column()),
    )
}

/// Build the single-statement DELETE by primary key. Binds one value: the
/// id. An empty RETURNING set means the row was absent.
pub fn build_delete(table: Table) -> String {
    format!(
        "DELETE FROM {} WHERE {} = ? RETURNING {}",
        quote_ident(table.name()),
        quote_ident(table.id_column()),
        quote_ident(table.id_column()),
    )
}

fn select_columns(schema: &[ColumnDescriptor]) -> String {
    schema
        .iter()
        .map(|col| {
            let quoted = quote_ident(&col.name);
            if col.kind.is_date_like() {
                format!("strftime('{DATE_FORMAT}', {quoted}) AS {quoted}")
            } else {
                quoted
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn column(name: &str, kind: ColumnKind) -> ColumnDescriptor {
        ColumnDescriptor {
            name: name.to_string(),
            kind,
            nullable: true,
        }
    }

    fn tender_schema() -> Vec<ColumnDescriptor> {
        vec![
            column("TenderID", ColumnKind::Integer),
            column("TenderName", ColumnKind::Text),
            column("TenderReferenceNo", ColumnKind::Text),
            column("StartDate", ColumnKind::Date),
            column("EndDate", ColumnKind::Date),
            column("DocumentPath", ColumnKind::Text),
            column("CreatedAt", ColumnKind::DateTime),
            column("UpdatedAt", ColumnKind::DateTime),
        ]
    }

    fn payload(pairs: &[(&str, Value)]) -> Map<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn integer_coercion_accepts_numbers_and_numeric_strings() {
        let col = column("Vacancies", ColumnKind::Integer);
        assert_eq!(
            coerce_value(&col, &json!(7)).unwrap(),
            BoundValue::Integer(7)
        );
        assert_eq!(
            coerce_value(&col, &json!(" 42 ")).unwrap(),
            BoundValue::Integer(42)
        );
        assert!(matches!(
            coerce_value(&col, &json!("seven")),
            Err(ApiError::Validation { .. })
        ));
    }

    #[test]
    fn date_coercion_normalizes_to_a_calendar_date() {
        let col = column("StartDate", ColumnKind::Date);
        let expected = BoundValue::Date(NaiveDate::from_ymd_opt(2025, 3, 14).unwrap());
        assert_eq!(coerce_value(&col, &json!("2025-03-14")).unwrap(), expected);
        assert_eq!(
            coerce_value(&col, &json!("2025-03-14 09:30:00")).unwrap(),
            expected
        );
        assert!(matches!(
            coerce_value(&col, &json!("14/03/2025")),
            Err(ApiError::Validation { .. })
        ));
    }

    #[test]
    fn datetime_coercion_accepts_a_bare_date() {
        let col = column("LastLogin", ColumnKind::DateTime);
        let value = coerce_value(&col, &json!("2025-03-14")).unwrap();
        assert_eq!(
            value,
            BoundValue::DateTime(
                NaiveDate::from_ymd_opt(2025, 3, 14)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap()
            )
        );
    }

    #[test]
    fn null_binds_as_null_regardless_of_kind() {
        let col = column("CorrigendumPath", ColumnKind::Text);
        assert_eq!(coerce_value(&col, &Value::Null).unwrap(), BoundValue::Null);
    }

    #[test]
    fn text_columns_pass_non_string_values_through_as_text() {
        let col = column("Remarks", ColumnKind::Text);
        assert_eq!(
            coerce_value(&col, &json!(12.5)).unwrap(),
            BoundValue::Text("12.5".to_string())
        );
    }

    #[test]
    fn insert_stamps_audit_columns_and_drops_the_id() {
        let body = payload(&[
            ("TenderID", json!(99)),
            ("TenderName", json!("Supply of gloves")),
            ("StartDate", json!("2025-01-01")),
        ]);
        let (sql, values) = build_insert(Table::Tenders, &body, &tender_schema()).unwrap();

        assert!(sql.starts_with("INSERT INTO \"tenders\""));
        assert!(sql.ends_with("RETURNING *"));
        assert!(!sql.contains("\"TenderID\""));
        assert!(sql.contains("\"CreatedAt\""));
        assert!(sql.contains("\"UpdatedAt\""));
        // TenderName, StartDate, CreatedAt, UpdatedAt
        assert_eq!(values.len(), 4);
        assert_eq!(sql.matches('?').count(), values.len());
    }

    #[test]
    fn insert_overrides_caller_supplied_audit_stamps() {
        let body = payload(&[
            ("TenderName", json!("x")),
            ("CreatedAt", json!("1999-01-01 00:00:00")),
        ]);
        let (_, values) = build_insert(Table::Tenders, &body, &tender_schema()).unwrap();

        let stale = NaiveDate::from_ymd_opt(1999, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        for value in values {
            if let BoundValue::DateTime(dt) = value {
                assert!(dt > stale);
            }
        }
    }

    #[test]
    fn unknown_fields_are_rejected_by_name() {
        let body = payload(&[("TenderName", json!("x")), ("Bogus", json!("y"))]);
        let error = build_insert(Table::Tenders, &body, &tender_schema()).unwrap_err();
        match error {
            ApiError::Validation { fields, .. } => assert_eq!(fields, vec!["Bogus".to_string()]),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn update_sets_only_submitted_fields_plus_updated_at() {
        let body = payload(&[("TenderName", json!("Renamed"))]);
        let (sql, values) = build_update(Table::Tenders, 5, &body, &tender_schema()).unwrap();

        assert!(sql.starts_with("UPDATE \"tenders\" SET"));
        assert!(sql.contains("\"TenderName\" = ?"));
        assert!(sql.contains("\"UpdatedAt\" = ?"));
        assert!(!sql.contains("\"StartDate\""));
        assert!(sql.contains("WHERE \"TenderID\" = ? RETURNING *"));
        assert_eq!(values.last(), Some(&BoundValue::Integer(5)));
    }

    #[test]
    fn select_all_formats_date_columns_and_orders_by_creation() {
        let sql = build_select_all(Table::Tenders, &tender_schema());
        assert!(sql.contains("strftime('%Y-%m-%d', \"StartDate\") AS \"StartDate\""));
        assert!(sql.contains("strftime('%Y-%m-%d', \"CreatedAt\") AS \"CreatedAt\""));
        assert!(sql.contains("\"TenderName\""));
        // Qualified so the sort sees the stored timestamp, not the
        // date-truncated alias.
        assert!(sql.ends_with("ORDER BY \"tenders\".\"CreatedAt\" DESC"));
    }

    #[test]
    fn select_all_without_created_at_has_no_order_clause() {
        let schema = vec![column("Name", ColumnKind::Text)];
        let sql = build_select_all(Table::Results, &schema);
        assert!(!sql.contains("ORDER BY"));
    }

    #[test]
    fn delete_is_a_single_statement_on_the_conventional_id() {
        let sql = build_delete(Table::Results);
        assert_eq!(
            sql,
            "DELETE FROM \"results\" WHERE \"ResultID\" = ? RETURNING \"ResultID\""
        );
    }

    #[test]
    fn select_one_filters_on_the_conventional_id() {
        let sql = build_select_one(Table::Tenders, &tender_schema());
        assert!(sql.ends_with("WHERE \"TenderID\" = ?"));
    }
}
