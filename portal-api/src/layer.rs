//! PortalLayer - Main Axum integration layer
//!
//! Mounts the portal API under a base path so the server binary (or any
//! other Axum application) can merge it next to its own routes.

use axum::Router;
use tower_http::cors::CorsLayer;

use crate::api;
use crate::db::Database;

/// Mountable portal API.
///
/// # Example
///
/// ```rust,no_run
/// use axum::Router;
/// use portal_api::{db::Database, PortalLayer};
///
/// # async fn example() -> portal_api::Result<()> {
/// let db = Database::connect("sqlite:portal.db?mode=rwc", 10).await?;
/// let app = Router::new().merge(PortalLayer::new("", db).into_router());
/// # Ok(())
/// # }
/// ```
pub struct PortalLayer {
    base_path: String,
    db: Database,
}

impl PortalLayer {
    /// Create a portal layer mounted at `base_path`. Pass an empty string to
    /// serve the API at `/api` directly.
    pub fn new(base_path: impl Into<String>, db: Database) -> Self {
        Self {
            base_path: base_path.into(),
            db,
        }
    }

    /// Convert into an Axum Router that can be merged.
    ///
    /// Routes land under `{base_path}/api/*` with a permissive CORS layer,
    /// matching the browser client's cross-origin fetches.
    pub fn into_router(self) -> Router {
        Router::new()
            .nest(&format!("{}/api", self.base_path), api::router(self.db))
            .layer(CorsLayer::permissive())
    }
}
