//! Document upload path stub
//!
//! Accepts a PDF, answers with the path the file would live under, and keeps
//! no bytes. Actual storage happens out of band; the portal tables only hold
//! the returned path string.

use axum::{extract::Multipart, response::Json};
use chrono::Utc;
use tracing::debug;

use crate::error::{ApiError, Result};
use crate::schema::UploadResponse;

/// POST /api/uploads
pub async fn upload_document(mut multipart: Multipart) -> Result<Json<UploadResponse>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        if field.content_type() != Some("application/pdf") {
            return Err(ApiError::validation("Only PDF files are allowed"));
        }

        let file_name = field
            .file_name()
            .map(|name| name.to_string())
            .unwrap_or_else(|| "document.pdf".to_string());

        // Drain the body; the stub never persists it.
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::validation(e.to_string()))?;

        // Timestamp prefix keeps concurrent uploads of the same name apart.
        let file_path = format!("/uploads/{}-{}", Utc::now().timestamp_millis(), file_name);
        debug!(file = file_name.as_str(), size = bytes.len(), "accepted upload");

        return Ok(Json(UploadResponse {
            success: true,
            file_path,
            file_name,
        }));
    }

    Err(ApiError::validation("No file provided"))
}
