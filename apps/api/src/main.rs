//! Back-office API for the medical distribution system.

use std::sync::Arc;

use axum_helpers::TokenKeys;
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_access::AuthState;
use domain_customers::registry::RegistryClient;
use domain_customers::CustomersState;
use migration::Migrator;
use object_storage::S3Storage;
use tokio::net::TcpListener;
use tracing::info;

mod config;
mod router;

use config::Config;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    let db = database::postgres::connect_with_retry(&config.database.url, None).await?;
    database::postgres::run_migrations::<Migrator>(&db, "backoffice_api").await?;

    let storage = S3Storage::new(&config.storage).map_err(|e| eyre::eyre!("{e}"))?;

    let auth_state = AuthState {
        db: db.clone(),
        keys: TokenKeys::new(&config.jwt),
    };
    let customers_state = CustomersState {
        db,
        storage: Arc::new(storage),
        registry: RegistryClient::new(),
    };

    let app = router::app(auth_state, customers_state);

    let listener = TcpListener::bind(config.server.address()).await?;
    info!("back-office API listening on {}", config.server.address());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("back-office API shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {err}");
        return;
    }
    info!("shutdown signal received");
}
