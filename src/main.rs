//! studio-sync server: outbox admin endpoints, health check, opportunistic
//! flushing and the optional background worker.

use std::sync::Arc;

use tokio::sync::watch;

use studio_sync::adapters::http::middleware::AdminAuthState;
use studio_sync::adapters::http::{app_router, with_http_layers, OutboxAppState};
use studio_sync::adapters::{
    FlushScheduler, HttpAdminSyncClient, OutboxWorker, PostgresOutboxStore,
};
use studio_sync::application::{BatchProcessor, HealthMonitor};
use studio_sync::config::AppConfig;
use studio_sync::observability::init_tracing;
use studio_sync::ports::{AdminSyncClient, OutboxHealthRepository, OutboxStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config.server);
    config.validate()?;

    tracing::info!(
        environment = ?config.server.environment,
        admin_sync_configured = config.admin_sync.is_configured(),
        "Starting studio-sync"
    );

    let pool = config
        .database
        .pool_options()
        .connect(&config.database.url)
        .await?;

    if config.database.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");
    }

    let postgres = Arc::new(
        PostgresOutboxStore::new(pool).with_max_attempts(config.outbox.max_attempts),
    );
    let store: Arc<dyn OutboxStore> = postgres.clone();
    let repository: Arc<dyn OutboxHealthRepository> = postgres;
    let health = HealthMonitor::new(store.clone(), repository);

    let client: Arc<dyn AdminSyncClient> =
        Arc::new(HttpAdminSyncClient::new(config.admin_sync.client_config())?);
    let processor = BatchProcessor::with_config(
        store,
        client,
        health,
        config.outbox.processor_config(),
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let worker = config.outbox.worker_enabled.then(|| {
        let worker = OutboxWorker::new(processor.clone(), config.outbox.worker_config());
        tokio::spawn(async move { worker.run(shutdown_rx).await })
    });

    let scheduler = config
        .outbox
        .flush_enabled
        .then(|| FlushScheduler::new(processor.clone(), config.outbox.flush_config()));
    let auth = AdminAuthState::new(config.admin_sync.secret.clone(), config.admin_sync.allow_cron);
    let state = OutboxAppState::new(processor, config.outbox.drain_batch_size);

    let app = with_http_layers(app_router(state, auth, scheduler), &config.server);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("HTTP server stopped");
    let _ = shutdown_tx.send(true);
    if let Some(handle) = worker {
        if let Err(e) = handle.await {
            tracing::error!(error = %e, "Outbox worker task failed");
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
