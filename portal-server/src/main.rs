use anyhow::Result;
use axum::{extract::State, http::StatusCode, routing::get, Router};
use portal_api::{db::Database, PortalLayer};
use tracing::info;

mod config;
mod database;

use config::Config;

#[derive(Clone)]
struct ApplicationState {
    db: Database,
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config: {e}");
        eprintln!("Using default configuration");
        Config::default()
    });

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level)),
        )
        .init();

    info!("Starting portal server v{}", env!("CARGO_PKG_VERSION"));
    info!("  Host: {}", config.server.host);
    info!("  Port: {}", config.server.port);
    info!("  Database: {}", config.database.url);

    let db = Database::connect(&config.database.url, config.database.max_connections).await?;
    database::setup(db.pool()).await?;

    let state = ApplicationState { db: db.clone() };
    let app = Router::new()
        .route("/health", get(health_handler))
        .with_state(state)
        .merge(PortalLayer::new("", db.clone()).into_router());

    let address = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!("Listening on http://{address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    // If signal registration fails we simply never shut down gracefully.
    let _ = tokio::signal::ctrl_c().await;
}

async fn health_handler(
    State(state): State<ApplicationState>,
) -> Result<(StatusCode, &'static str), StatusCode> {
    state
        .db
        .ping()
        .await
        .map_err(|_| StatusCode::SERVICE_UNAVAILABLE)?;

    Ok((StatusCode::OK, "ok"))
}
