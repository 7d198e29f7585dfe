//! ride-ledger server entry point.
//!
//! Starts the Axum HTTP server over the configured key/value backend.

use std::sync::Arc;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use ride_ledger::api;
use ride_ledger::app_state::AppState;
use ride_ledger::config::{ServiceConfig, StoreBackend};
use ride_ledger::identity::StaticTokenResolver;
use ride_ledger::service::{HistoryService, RideService};
use ride_ledger::store::{KeyValueStore, MemoryStore, PostgresStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = ServiceConfig::from_env()?;
    tracing::info!(addr = %config.listen_addr, backend = ?config.store_backend, "starting ride-ledger");

    // Build store layer
    let store: Arc<dyn KeyValueStore> = match config.store_backend {
        StoreBackend::Memory => Arc::new(MemoryStore::new()),
        StoreBackend::Postgres => Arc::new(PostgresStore::connect(&config).await?),
    };

    // Build service layer
    let ride_service = Arc::new(RideService::new(Arc::clone(&store)));
    let history_service = Arc::new(HistoryService::new(store));

    // Identity resolution is an external concern; deployments replace the
    // static resolver with their provider's implementation.
    let identity = Arc::new(StaticTokenResolver::new());

    // Build application state
    let app_state = AppState {
        ride_service,
        history_service,
        identity,
    };

    // Build router
    let app = Router::new().merge(api::build_router());

    #[cfg(feature = "swagger-ui")]
    let app = {
        use utoipa::OpenApi;
        app.merge(utoipa_swagger_ui::SwaggerUi::new("/swagger-ui").url(
            "/api-docs/openapi.json",
            ride_ledger::api::doc::ApiDoc::openapi(),
        ))
    };

    let app = app
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
