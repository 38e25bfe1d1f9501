//! Generic table CRUD handlers
//!
//! All five verbs share one skeleton: parse the table against the allow-list,
//! check out a connection, introspect the live schema where needed, build a
//! parameterized statement, execute, and map rows to JSON. The connection
//! guard drops at the end of every path, success or error, which returns it
//! to the pool.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::db::{row_to_json, Database};
use crate::error::{ApiError, Result};
use crate::introspect;
use crate::statement::{self, bind_values};
use crate::tables::Table;

fn parse_table(name: &str) -> Result<Table> {
    Table::from_name(name)
}

fn parse_id(table: Table, raw: &str) -> Result<i64> {
    raw.parse::<i64>().map_err(|_| ApiError::Validation {
        message: format!("Invalid {} value: {raw}", table.id_column()),
        fields: vec![table.id_column().to_string()],
    })
}

/// GET /api/tables/{table}
///
/// Returns every row, newest first. An empty table is an empty array, not an
/// error; an unknown table never reaches statement construction.
pub async fn list_records(
    State(db): State<Database>,
    Path(table): Path<String>,
) -> Result<Json<Vec<Value>>> {
    let table = parse_table(&table)?;
    debug!(table = table.name(), "listing records");

    let mut conn = db.acquire().await?;
    let schema = introspect::describe_table(&mut conn, table).await?;
    let sql = statement::build_select_all(table, &schema);

    let rows = sqlx::query(&sql).fetch_all(&mut *conn).await?;
    let records = rows.iter().map(row_to_json).collect::<Result<Vec<_>>>()?;

    debug!(table = table.name(), count = records.len(), "listed records");
    Ok(Json(records))
}

/// GET /api/tables/{table}/{id}
pub async fn get_record(
    State(db): State<Database>,
    Path((table, id)): Path<(String, String)>,
) -> Result<Json<Value>> {
    let table = parse_table(&table)?;
    let id = parse_id(table, &id)?;

    let mut conn = db.acquire().await?;
    let schema = introspect::describe_table(&mut conn, table).await?;
    let sql = statement::build_select_one(table, &schema);

    let row = sqlx::query(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| ApiError::NotFound("Record not found".to_string()))?;

    Ok(Json(row_to_json(&row)?))
}

/// POST /api/tables/{table}
///
/// Validates the hardcoded required-field list before touching the database,
/// then inserts with `RETURNING *` so the generated id and the created-row
/// read-back are atomic with the write.
pub async fn create_record(
    State(db): State<Database>,
    Path(table): Path<String>,
    Json(payload): Json<Map<String, Value>>,
) -> Result<(StatusCode, Json<Value>)> {
    let table = parse_table(&table)?;
    check_required_fields(table, &payload)?;

    let mut conn = db.acquire().await?;
    let schema = introspect::describe_table(&mut conn, table).await?;
    let (sql, values) = statement::build_insert(table, &payload, &schema)?;

    let row = bind_values(sqlx::query(&sql), &values)
        .fetch_one(&mut *conn)
        .await?;
    let record = row_to_json(&row)?;

    info!(table = table.name(), "created record");
    Ok((StatusCode::CREATED, Json(record)))
}

/// PUT /api/tables/{table}/{id}
///
/// Updates only the submitted fields and always refreshes `UpdatedAt`. A row
/// that does not exist shows up as an empty RETURNING set on the write
/// itself, with no separate read-back round trip.
pub async fn update_record(
    State(db): State<Database>,
    Path((table, id)): Path<(String, String)>,
    Json(payload): Json<Map<String, Value>>,
) -> Result<Json<Value>> {
    let table = parse_table(&table)?;
    let id = parse_id(table, &id)?;

    let mut conn = db.acquire().await?;
    let schema = introspect::describe_table(&mut conn, table).await?;
    let (sql, values) = statement::build_update(table, id, &payload, &schema)?;

    let row = bind_values(sqlx::query(&sql), &values)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| ApiError::NotFound("Record not found".to_string()))?;
    let record = row_to_json(&row)?;

    info!(table = table.name(), id, "updated record");
    Ok(Json(record))
}

/// DELETE /api/tables/{table}/{id}
///
/// A single atomic statement; existence and deletion cannot race against a
/// concurrent writer.
pub async fn delete_record(
    State(db): State<Database>,
    Path((table, id)): Path<(String, String)>,
) -> Result<StatusCode> {
    let table = parse_table(&table)?;
    let id = parse_id(table, &id)?;

    let mut conn = db.acquire().await?;
    let sql = statement::build_delete(table);

    let deleted = sqlx::query(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    if deleted.is_none() {
        return Err(ApiError::NotFound("Record not found".to_string()));
    }

    info!(table = table.name(), id, "deleted record");
    Ok(StatusCode::NO_CONTENT)
}

fn check_required_fields(table: Table, payload: &Map<String, Value>) -> Result<()> {
    let missing: Vec<String> = table
        .required_fields()
        .iter()
        .filter(|field| {
            match payload.get(**field) {
                None | Some(Value::Null) => true,
                Some(Value::String(s)) => s.is_empty(),
                Some(_) => false,
            }
        })
        .map(|field| field.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Validation {
            message: format!(
                "Missing required fields: {}",
                missing.join(", ")
            ),
            fields: missing,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_required_fields_are_reported_together() {
        let mut payload = Map::new();
        payload.insert("TenderName".to_string(), json!("x"));
        payload.insert("DocumentPath".to_string(), json!(""));

        let error = check_required_fields(Table::Tenders, &payload).unwrap_err();
        match error {
            ApiError::Validation { fields, .. } => {
                assert!(fields.contains(&"TenderReferenceNo".to_string()));
                assert!(fields.contains(&"StartDate".to_string()));
                assert!(fields.contains(&"EndDate".to_string()));
                // Present but empty counts as missing.
                assert!(fields.contains(&"DocumentPath".to_string()));
                assert!(!fields.contains(&"TenderName".to_string()));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn tables_without_declared_requirements_accept_any_subset() {
        let payload = Map::new();
        assert!(check_required_fields(Table::MedicalFaculty, &payload).is_ok());
    }

    #[test]
    fn non_numeric_ids_are_rejected() {
        let error = parse_id(Table::Tenders, "abc").unwrap_err();
        assert!(matches!(error, ApiError::Validation { .. }));
        assert_eq!(parse_id(Table::Tenders, "12").unwrap(), 12);
    }
}
