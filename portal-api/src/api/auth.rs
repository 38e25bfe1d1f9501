//! Staff login endpoint
//!
//! One parameterized credential check against the `admin` table; a match
//! stamps `LastLogin` and answers `{success: true}`. No session or token is
//! issued — the portal runs on a trusted internal network and table routes
//! perform no further credential check.

use axum::{extract::State, http::StatusCode, response::Json};
use chrono::Utc;
use sqlx::Row;
use tracing::{info, warn};

use crate::db::Database;
use crate::error::{ApiError, Result};
use crate::schema::{LoginRequest, LoginResponse};

/// POST /api/auth/login
pub async fn login(
    State(db): State<Database>,
    Json(request): Json<LoginRequest>,
) -> Result<(StatusCode, Json<LoginResponse>)> {
    if request.email.is_empty() || request.password.is_empty() {
        return Err(ApiError::validation("Email and password are required"));
    }

    let mut conn = db.acquire().await?;

    let account = sqlx::query("SELECT \"AdminID\" FROM \"admin\" WHERE \"Email\" = ? AND \"Password\" = ?")
        .bind(&request.email)
        .bind(&request.password)
        .fetch_optional(&mut *conn)
        .await?;

    match account {
        Some(row) => {
            let admin_id: i64 = row.try_get("AdminID")?;
            let now = Utc::now().naive_utc().format("%Y-%m-%d %H:%M:%S").to_string();

            sqlx::query("UPDATE \"admin\" SET \"LastLogin\" = ? WHERE \"AdminID\" = ?")
                .bind(&now)
                .bind(admin_id)
                .execute(&mut *conn)
                .await?;

            info!(email = request.email.as_str(), "login successful");
            Ok((
                StatusCode::OK,
                Json(LoginResponse {
                    success: true,
                    error: None,
                }),
            ))
        }
        None => {
            warn!(email = request.email.as_str(), "login rejected");
            Ok((
                StatusCode::UNAUTHORIZED,
                Json(LoginResponse {
                    success: false,
                    error: Some("Invalid email or password".to_string()),
                }),
            ))
        }
    }
}
