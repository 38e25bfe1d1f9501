//! Error taxonomy for the portal API
//!
//! Every failure a request handler can hit maps onto one of these variants,
//! and each variant carries a fixed HTTP status. Driver errors keep their
//! SQLite error code in the response `details` for diagnostics; stack traces
//! never reach the client.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Establishing or checking out a database connection failed.
    #[error("Database connection failed: {0}")]
    Connection(String),

    /// The table is not in the allow-list or introspection returned nothing.
    #[error("Table not found: {0}")]
    Schema(String),

    /// The payload failed validation against the live table schema.
    #[error("{message}")]
    Validation {
        message: String,
        /// Offending field names, if the failure is field-specific.
        fields: Vec<String>,
    },

    /// The addressed row does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Any other database execution failure.
    #[error("Query failed: {message}")]
    Query {
        message: String,
        /// Driver error code, when the backend reported one.
        code: Option<String>,
    },
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            fields: Vec::new(),
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Connection(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Schema(_) => StatusCode::NOT_FOUND,
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Query { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::Validation { message, fields } if !fields.is_empty() => {
                serde_json::json!({
                    "error": message,
                    "details": { "fields": fields },
                })
            }
            ApiError::Query { message, code } => serde_json::json!({
                "error": "Query failed",
                "details": { "message": message, "code": code },
            }),
            other => serde_json::json!({ "error": other.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(error: sqlx::Error) -> Self {
        match error {
            sqlx::Error::RowNotFound => ApiError::NotFound("Record not found".to_string()),
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
                ApiError::Connection(error.to_string())
            }
            sqlx::Error::Io(e) => ApiError::Connection(e.to_string()),
            sqlx::Error::Database(e) => ApiError::Query {
                message: e.message().to_string(),
                code: e.code().map(|c| c.to_string()),
            },
            other => ApiError::Query {
                message: other.to_string(),
                code: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_with_fields_lists_them_in_details() {
        let error = ApiError::Validation {
            message: "Missing required fields".to_string(),
            fields: vec!["TenderName".to_string()],
        };
        assert_eq!(error.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn statuses_follow_the_taxonomy() {
        assert_eq!(
            ApiError::Schema("nope".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::NotFound("gone".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Connection("refused".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::Query {
                message: "syntax error".into(),
                code: Some("1".into())
            }
            .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
