//! Persistence service: startup hydration and background flush of dirty statuses.
//!
//! DESIGN
//! ======
//! The `StatusBook` is authoritative while the server runs. A background
//! task snapshots dirty statuses under the lock, writes them to Postgres
//! lock-free, then sleeps for the configured interval before the next cycle.
//!
//! ERROR HANDLING
//! ==============
//! Dirty flags are cleared only after successful writes, and only for
//! statuses whose revision did not move while the write was in flight.
//! Repeated upserts are acceptable; silently dropping an edit is not.

use std::time::Duration;

use records::Status;
use sqlx::PgPool;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::state::{AppState, StatusBook};

/// Spawn the background flush task. Returns a handle for shutdown.
pub fn spawn_persistence_task(state: AppState, pool: PgPool, flush_interval_ms: u64) -> JoinHandle<()> {
    info!(flush_interval_ms, "status persistence flush configured");
    tokio::spawn(async move {
        loop {
            flush_all_dirty(&state, &pool).await;
            tokio::time::sleep(Duration::from_millis(flush_interval_ms)).await;
        }
    })
}

/// Statuses captured for one flush, with the revision each was captured at.
#[derive(Debug, Default)]
pub(crate) struct DirtySnapshot {
    pub(crate) statuses: Vec<Status>,
    pub(crate) revisions: Vec<(String, u64)>,
}

/// Clone every dirty status out of the book.
pub(crate) fn snapshot_dirty(book: &StatusBook) -> DirtySnapshot {
    let mut snapshot = DirtySnapshot::default();
    for id in &book.dirty {
        let (Some(status), Some(revision)) = (book.get(id), book.revision(id)) else {
            continue;
        };
        snapshot.statuses.push(status.clone());
        snapshot.revisions.push((id.clone(), revision));
    }
    snapshot
}

/// Clear dirty flags for statuses that were not touched again after the snapshot.
pub(crate) fn clear_flushed(book: &mut StatusBook, flushed: &[(String, u64)]) {
    for (id, flushed_revision) in flushed {
        // EDGE: keep dirty flag if the status was updated again after snapshot.
        let can_clear = book.revision(id).is_none_or(|current| current == *flushed_revision);
        if can_clear {
            book.dirty.remove(id);
        }
    }
}

async fn flush_all_dirty(state: &AppState, pool: &PgPool) {
    // PHASE: SNAPSHOT DIRTY STATUSES
    // WHY: collect immutable clones under lock, then perform I/O lock-free.
    let snapshot = {
        let book = state.book.read().await;
        if book.dirty.is_empty() {
            return;
        }
        snapshot_dirty(&book)
    };

    // PHASE: FLUSH + ACK DIRTY IDS
    // WHY: if flush fails we intentionally keep dirty flags for retry.
    match upsert_statuses(pool, &snapshot.statuses).await {
        Ok(()) => {
            debug!(count = snapshot.statuses.len(), "statuses flushed");
            let mut book = state.book.write().await;
            clear_flushed(&mut book, &snapshot.revisions);
        }
        Err(e) => {
            error!(error = %e, count = snapshot.statuses.len(), "persistence flush failed");
        }
    }
}

/// Upsert statuses in a single transaction.
///
/// # Errors
///
/// Returns the first database error; the transaction is rolled back.
pub async fn upsert_statuses(pool: &PgPool, statuses: &[Status]) -> Result<(), sqlx::Error> {
    if statuses.is_empty() {
        return Ok(());
    }

    let mut tx = pool.begin().await?;
    for status in statuses {
        let document = serde_json::to_value(status).map_err(|e| sqlx::Error::Encode(Box::new(e)))?;
        sqlx::query(
            "INSERT INTO statuses (status_id, client_id, advisor_id, source_id, tracking_id, document, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, now()) \
             ON CONFLICT (status_id) DO UPDATE SET \
                 client_id = EXCLUDED.client_id, advisor_id = EXCLUDED.advisor_id, \
                 source_id = EXCLUDED.source_id, tracking_id = EXCLUDED.tracking_id, \
                 document = EXCLUDED.document, updated_at = now()",
        )
        .bind(&status.status_id)
        .bind(&status.client_id)
        .bind(&status.advisor_id)
        .bind(&status.source_id)
        .bind(&status.tracking_id)
        .bind(&document)
        .execute(tx.as_mut())
        .await?;
    }
    tx.commit().await?;
    Ok(())
}

/// Load every stored status, oldest first. Rows whose document no longer
/// matches the model are skipped with a warning.
///
/// # Errors
///
/// Returns an error if the query fails.
pub async fn load_statuses(pool: &PgPool) -> Result<Vec<Status>, sqlx::Error> {
    let rows = sqlx::query_as::<_, (String, serde_json::Value)>(
        "SELECT status_id, document FROM statuses ORDER BY created_at, status_id",
    )
    .fetch_all(pool)
    .await?;

    let mut statuses = Vec::with_capacity(rows.len());
    for (status_id, document) in rows {
        match serde_json::from_value::<Status>(document) {
            Ok(status) => statuses.push(status),
            Err(e) => warn!(%status_id, error = %e, "skipping unreadable status document"),
        }
    }
    Ok(statuses)
}

/// Build a book from storage. When storage is empty and `seed` is set, the
/// sample dataset is loaded and marked dirty so the first flush writes it.
///
/// # Errors
///
/// Returns an error if loading from Postgres fails.
pub async fn hydrate_book(pool: &PgPool, seed: bool) -> Result<StatusBook, sqlx::Error> {
    let stored = load_statuses(pool).await?;
    let mut book = StatusBook::new();
    if stored.is_empty() && seed {
        seed_book(&mut book, true);
        return Ok(book);
    }
    let count = stored.len();
    for status in stored {
        book.load(status);
    }
    info!(count, "status book hydrated from database");
    Ok(book)
}

/// Load the bundled sample dataset. `mark_dirty` queues it for the next flush.
pub fn seed_book(book: &mut StatusBook, mark_dirty: bool) {
    match records::seed::statuses() {
        Ok(statuses) => {
            let count = statuses.len();
            for status in statuses {
                if mark_dirty {
                    book.insert(status);
                } else {
                    book.load(status);
                }
            }
            info!(count, "status book seeded with sample data");
        }
        Err(e) => error!(error = %e, "bundled sample data is unreadable; starting empty"),
    }
}

#[cfg(test)]
#[path = "persistence_test.rs"]
mod tests;
