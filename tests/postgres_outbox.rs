//! PostgreSQL outbox store tests.
//!
//! Ignored by default. Run against a scratch database with:
//!
//! ```text
//! STUDIO_SYNC_TEST_DATABASE_URL=postgres://localhost/studio_sync_test \
//!     cargo test --test postgres_outbox -- --ignored --test-threads=1
//! ```

use std::time::Duration;

use serde_json::json;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use studio_sync::adapters::PostgresOutboxStore;
use studio_sync::domain::foundation::Timestamp;
use studio_sync::domain::outbox::{
    HealthStatus, HealthUpdate, NewOutboxEvent, OutboxEventType, OutboxStatus,
};
use studio_sync::ports::{OutboxHealthRepository, OutboxStore};

async fn pool() -> Option<PgPool> {
    let url = std::env::var("STUDIO_SYNC_TEST_DATABASE_URL").ok()?;
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await
        .expect("test database should be reachable");
    sqlx::migrate!("./migrations").run(&pool).await.unwrap();
    sqlx::query("TRUNCATE sync_outbox, sync_outbox_status")
        .execute(&pool)
        .await
        .unwrap();
    Some(pool)
}

fn event(n: i32) -> NewOutboxEvent {
    NewOutboxEvent::new(OutboxEventType::StudioSync, json!({ "id": n }), None)
}

#[tokio::test]
#[ignore]
async fn claim_ack_nack_lifecycle() {
    let Some(pool) = pool().await else { return };
    let store = PostgresOutboxStore::new(pool.clone());

    let first = store.enqueue(event(1)).await.unwrap();
    let second = store.enqueue(event(2)).await.unwrap();

    let claimed = store.claim_batch(10).await.unwrap();
    assert_eq!(claimed.iter().map(|e| e.id).collect::<Vec<_>>(), [first, second]);
    assert!(claimed.iter().all(|e| e.status == OutboxStatus::Processing));
    assert!(store.claim_batch(10).await.unwrap().is_empty());

    store.ack(first).await.unwrap();
    store.nack(second, 0, "Admin sync failed (500): boom").await.unwrap();

    let (status, attempts, error, delay): (String, i32, Option<String>, f64) = sqlx::query_as(
        "SELECT status, attempts, last_error, \
         EXTRACT(EPOCH FROM next_retry_at - updated_at)::float8 \
         FROM sync_outbox WHERE id = $1",
    )
    .bind(second.as_uuid())
    .fetch_one(&pool)
    .await
    .unwrap();

    assert_eq!(status, "pending");
    assert_eq!(attempts, 1);
    assert_eq!(error.as_deref(), Some("Admin sync failed (500): boom"));
    assert!((delay - 15.0).abs() < 1.0);

    let snapshot = store.backlog_snapshot().await.unwrap();
    assert_eq!(snapshot.pending_count, 1);
    assert!(store.claim_batch(10).await.unwrap().is_empty());
}

#[tokio::test]
#[ignore]
async fn concurrent_claims_never_overlap() {
    let Some(pool) = pool().await else { return };
    let store = PostgresOutboxStore::new(pool);
    for n in 0..30 {
        store.enqueue(event(n)).await.unwrap();
    }

    let (a, b, c) = tokio::join!(
        store.claim_batch(12),
        store.claim_batch(12),
        store.claim_batch(12)
    );
    let mut ids: Vec<_> = [a.unwrap(), b.unwrap(), c.unwrap()]
        .into_iter()
        .flatten()
        .map(|e| e.id)
        .collect();
    let total = ids.len();
    ids.sort();
    ids.dedup();

    assert_eq!(total, 30);
    assert_eq!(ids.len(), 30);
}

#[tokio::test]
#[ignore]
async fn attempt_cap_marks_dead() {
    let Some(pool) = pool().await else { return };
    let store = PostgresOutboxStore::new(pool).with_max_attempts(Some(1));
    let id = store.enqueue(event(1)).await.unwrap();

    store.claim_batch(1).await.unwrap();
    store.nack(id, 0, "boom").await.unwrap();

    let snapshot = store.backlog_snapshot().await.unwrap();
    assert_eq!(snapshot.pending_count, 0);
    assert_eq!(snapshot.last_error.as_deref(), Some("boom"));
}

#[tokio::test]
#[ignore]
async fn stale_claims_are_reclaimed() {
    let Some(pool) = pool().await else { return };
    let store = PostgresOutboxStore::new(pool.clone());
    store.enqueue(event(1)).await.unwrap();
    store.claim_batch(1).await.unwrap();

    sqlx::query("UPDATE sync_outbox SET locked_at = NOW() - INTERVAL '1 hour'")
        .execute(&pool)
        .await
        .unwrap();

    assert_eq!(store.reclaim_stale(Duration::from_secs(600)).await.unwrap(), 1);
    assert_eq!(store.claim_batch(1).await.unwrap().len(), 1);
}

#[tokio::test]
#[ignore]
async fn health_row_keeps_transition_timestamps() {
    let Some(pool) = pool().await else { return };
    let store = PostgresOutboxStore::new(pool);
    assert!(store.load().await.unwrap().is_none());

    let degraded_at = Timestamp::now();
    let degraded = HealthUpdate {
        status: HealthStatus::Degraded,
        pending_count: 3,
        oldest_pending_at: Some(degraded_at),
        last_error: Some("boom".to_string()),
        degraded_at: Some(degraded_at),
        recovered_at: None,
        at: degraded_at,
    };
    store.save(&degraded).await.unwrap();

    let healthy = HealthUpdate {
        status: HealthStatus::Healthy,
        pending_count: 0,
        oldest_pending_at: None,
        last_error: None,
        degraded_at: None,
        recovered_at: Some(Timestamp::now()),
        at: Timestamp::now(),
    };
    let saved = store.save(&healthy).await.unwrap();

    assert_eq!(saved.status, HealthStatus::Healthy);
    assert_eq!(saved.pending_count, 0);
    assert!(saved.last_degraded_at.is_some());
    assert!(saved.last_recovered_at.is_some());
    assert_eq!(store.load().await.unwrap(), Some(saved));
}
