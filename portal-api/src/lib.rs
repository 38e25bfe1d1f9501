//! # portal-api
//!
//! Backend API for the staff administration portal: generic CRUD over a fixed
//! set of portal tables (tenders, results, staff-position postings), a login
//! endpoint against the `admin` table, and a PDF upload path stub.
//!
//! The table API is metadata-driven: every request introspects the live table
//! schema, coerces the JSON payload against the discovered column types, and
//! builds a fully parameterized statement. Table names never come from client
//! input directly; they are parsed against the compile-time allow-list in
//! [`tables::Table`] before any SQL is assembled.
//!
//! ## Security notes
//!
//! - The login endpoint issues no session or token; table routes perform no
//!   credential check. The portal is intended for a trusted internal network.
//! - Values are always bound parameters. Identifiers interpolated into SQL
//!   come from the allow-list or from schema introspection, never from the
//!   request.
//!
//! ## Example
//!
//! ```rust,no_run
//! use axum::Router;
//! use portal_api::{db::Database, PortalLayer};
//!
//! # async fn example() -> portal_api::Result<()> {
//! let db = Database::connect("sqlite::memory:", 10).await?;
//! let app = Router::new().merge(PortalLayer::new("", db).into_router());
//! // Serve the application...
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod db;
pub mod error;
pub mod introspect;
pub mod layer;
pub mod schema;
pub mod statement;
pub mod tables;

pub use error::{ApiError, Result};
pub use layer::PortalLayer;
pub use schema::{ColumnDescriptor, ColumnKind};
pub use tables::Table;
