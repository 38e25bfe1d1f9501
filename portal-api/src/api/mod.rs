//! REST API endpoints
//!
//! Table CRUD, the login endpoint, and the document upload stub.

use axum::{
    routing::{get, post},
    Router,
};

use crate::db::Database;

pub mod auth;
pub mod tables;
pub mod uploads;

/// Create the API router with all endpoints and state attached.
pub fn router(db: Database) -> Router {
    Router::new()
        .route(
            "/tables/{table}",
            get(tables::list_records).post(tables::create_record),
        )
        .route(
            "/tables/{table}/{id}",
            get(tables::get_record)
                .put(tables::update_record)
                .delete(tables::delete_record),
        )
        .route("/auth/login", post(auth::login))
        .route("/uploads", post(uploads::upload_document))
        .with_state(db)
}
