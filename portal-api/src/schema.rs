//! Schema types for live table introspection
//!
//! Descriptors are a per-request snapshot of a table's columns; nothing here
//! is cached or persisted.

use serde::{Deserialize, Serialize};

/// Broad column type classification used for payload coercion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ColumnKind {
    Integer,
    BigInt,
    Date,
    DateTime,
    Text,
    Other,
}

impl ColumnKind {
    /// Date-like columns get a `YYYY-MM-DD` display conversion in SELECTs.
    pub fn is_date_like(&self) -> bool {
        matches!(self, ColumnKind::Date | ColumnKind::DateTime)
    }
}

/// Information about a single column
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDescriptor {
    /// Column name
    pub name: String,

    /// Classified data type
    pub kind: ColumnKind,

    /// Whether the column allows NULL values
    pub nullable: bool,
}

/// Login request body
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response body
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Response for the document upload stub
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    pub file_path: String,
    pub file_name: String,
}
