//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! It holds the optional database pool and the `StatusBook`, the in-memory
//! authoritative copy of every status. Writes go to the book first and are
//! marked dirty; the persistence task flushes them to Postgres later.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use records::Status;
use sqlx::PgPool;
use tokio::sync::RwLock;

// =============================================================================
// STATUS BOOK
// =============================================================================

/// All live statuses, kept in memory for fast reads.
#[derive(Debug, Default)]
pub struct StatusBook {
    statuses: HashMap<String, Status>,
    /// Status IDs in insertion order, so listings are stable.
    order: Vec<String>,
    /// Bumped on every write; the flusher compares it before clearing dirty flags.
    revisions: HashMap<String, u64>,
    /// Status IDs modified since last flush.
    pub dirty: HashSet<String>,
}

impl StatusBook {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert without marking dirty. Used when hydrating from storage or seeding.
    pub fn load(&mut self, status: Status) {
        let id = status.status_id.clone();
        if self.statuses.insert(id.clone(), status).is_none() {
            self.order.push(id.clone());
        }
        self.revisions.entry(id).or_insert(0);
    }

    /// Insert or replace a status and mark it dirty.
    pub fn insert(&mut self, status: Status) {
        let id = status.status_id.clone();
        self.load(status);
        self.touch(&id);
    }

    #[must_use]
    pub fn get(&self, status_id: &str) -> Option<&Status> {
        self.statuses.get(status_id)
    }

    /// Mutate a status in place. Marks it dirty only when it exists.
    pub fn update<R>(&mut self, status_id: &str, apply: impl FnOnce(&mut Status) -> R) -> Option<R> {
        let status = self.statuses.get_mut(status_id)?;
        let out = apply(status);
        self.touch(status_id);
        Some(out)
    }

    /// Statuses in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Status> {
        self.order.iter().filter_map(|id| self.statuses.get(id))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }

    #[must_use]
    pub fn revision(&self, status_id: &str) -> Option<u64> {
        self.revisions.get(status_id).copied()
    }

    fn touch(&mut self, status_id: &str) {
        *self.revisions.entry(status_id.to_owned()).or_insert(0) += 1;
        self.dirty.insert(status_id.to_owned());
    }
}

// =============================================================================
// APP STATE
// =============================================================================

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; all inner fields are Arc-wrapped or Clone.
#[derive(Clone)]
pub struct AppState {
    /// `None` when running without `DATABASE_URL`.
    pub pool: Option<PgPool>,
    pub book: Arc<RwLock<StatusBook>>,
}

impl AppState {
    #[must_use]
    pub fn new(pool: Option<PgPool>, book: StatusBook) -> Self {
        Self { pool, book: Arc::new(RwLock::new(book)) }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================


#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
