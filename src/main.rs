use std::sync::Arc;

use dotenvy::dotenv;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use billetterie_server::config::{Config, StorageBackend};
use billetterie_server::routes::create_routes;
use billetterie_server::state::AppState;
use billetterie_server::store::{MemoryStore, PgStore, TicketStore};

const DEFAULT_LOG_FILTER: &str = "billetterie_server=info,tower_http=info";

async fn open_store(config: &Config) -> Arc<dyn TicketStore> {
    match config.storage {
        StorageBackend::Postgres => {
            let store = PgStore::connect(&config.database_url, config.max_connections)
                .await
                .expect("Failed to connect to database");
            tracing::info!("Successfully connected to database");

            store.migrate().await.expect("Failed to run migrations");
            tracing::info!("Migrations run successfully");

            Arc::new(store)
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage, data is lost on restart");
            Arc::new(MemoryStore::new())
        }
    }
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let config = Config::from_env();
    let store = open_store(&config).await;
    store
        .seed_defaults()
        .await
        .expect("Failed to seed sample data");

    let addr = config.bind_addr;
    let app = create_routes(AppState::new(store, config));

    let listener = TcpListener::bind(addr)
        .await
        .expect("Failed to bind address");
    tracing::info!("🚀 Server running at http://{}", addr);
    tracing::info!("📊 API available at http://{}/api", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server failed");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received, draining connections");
}
