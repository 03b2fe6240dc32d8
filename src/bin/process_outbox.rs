//! One-shot drain of the outbox, for cron jobs and manual recovery.
//!
//! Claims batches until nothing is claimable, then refreshes the health row.
//! Exits non-zero when the store is unreachable; delivery failures are
//! counted, not fatal.

use std::process::ExitCode;
use std::sync::Arc;

use studio_sync::adapters::{HttpAdminSyncClient, PostgresOutboxStore};
use studio_sync::application::{BatchProcessor, HealthMonitor};
use studio_sync::config::AppConfig;
use studio_sync::observability::init_tracing;
use studio_sync::ports::{AdminSyncClient, OutboxHealthRepository, OutboxStore};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Outbox drain failed");
            eprintln!("process-outbox: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config.server);
    config.validate()?;

    let pool = config
        .database
        .pool_options()
        .connect(&config.database.url)
        .await?;

    let postgres = Arc::new(
        PostgresOutboxStore::new(pool).with_max_attempts(config.outbox.max_attempts),
    );
    let store: Arc<dyn OutboxStore> = postgres.clone();
    let repository: Arc<dyn OutboxHealthRepository> = postgres;
    let client: Arc<dyn AdminSyncClient> =
        Arc::new(HttpAdminSyncClient::new(config.admin_sync.client_config())?);

    let processor = BatchProcessor::with_config(
        store.clone(),
        client,
        HealthMonitor::new(store, repository),
        config.outbox.processor_config(),
    );

    let result = processor
        .drain_until_empty(config.outbox.drain_batch_size)
        .await?;

    tracing::info!(
        processed = result.processed,
        failed = result.failed,
        "Outbox drain complete"
    );
    println!("processed={} failed={}", result.processed, result.failed);
    Ok(())
}
