pub mod api;
pub mod config;
pub mod error;
pub mod logic;
pub mod metrics;
pub mod model;
pub mod store;

// Export API types
pub use api::handlers;
pub use api::routes;

pub use error::{BrokerError, ErrorKind};
pub use logic::InstanceService;
pub use metrics::{CountingMetrics, InstanceMetrics};

// Export all model types
pub use model::*;

// Export store types
pub use store::{InstanceStore, MemoryStore, PostgresStore, StoreError};

use std::sync::Arc;

use crate::api::handlers::BrokerState;
use crate::config::{AppConfig, StoreBackend};

/// Wire the catalog, store and metrics sink into a router ready to serve
pub fn build_app<S: InstanceStore + 'static>(catalog: Catalog, store: Arc<S>) -> axum::Router {
    let metrics = Arc::new(CountingMetrics::new());
    let state = Arc::new(BrokerState {
        instances: InstanceService::new(Arc::new(catalog), store, metrics.clone()),
        metrics,
    });

    crate::api::routes::create_router::<S>().with_state(state)
}

/// Build the application from configuration, connecting to the configured store backend
pub async fn build_app_from_config(config: &AppConfig) -> anyhow::Result<axum::Router> {
    let catalog = config.catalog()?;
    log::info!("Catalog loaded with {} service(s)", catalog.services().len());

    let app = match config.database.backend {
        StoreBackend::Memory => {
            log::warn!("Using in-memory instance store; instances are lost on restart");
            build_app(catalog, Arc::new(MemoryStore::new()))
        }
        StoreBackend::Postgres => {
            let database_url = config.database_url()?;
            let postgres_store = PostgresStore::new(&database_url, config.max_connections()).await?;
            postgres_store.migrate().await?;
            build_app(catalog, Arc::new(postgres_store))
        }
    };

    Ok(app)
}

/// Process entry point: load `.env` and configuration, set up logging and serve until shutdown
pub async fn run_server() -> anyhow::Result<()> {
    use axum::serve;
    use env_logger::Builder;
    use log::LevelFilter;
    use tokio::net::TcpListener;

    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    // Info by default with sqlx debug logs suppressed; RUST_LOG overrides
    Builder::new()
        .filter_level(LevelFilter::Info)
        .filter_module("sqlx", LevelFilter::Warn)
        .parse_default_env()
        .init();

    let config = AppConfig::load()?;
    log::info!(
        "Configuration loaded: server={}:{} store={:?}",
        config.server.host,
        config.server.port,
        config.database.backend
    );

    let app = build_app_from_config(&config).await?;

    let bind_address = config.server_address();
    let listener = TcpListener::bind(&bind_address).await?;
    log::info!("Service broker listening on http://{}", bind_address);

    serve(listener, app).await?;

    Ok(())
}
