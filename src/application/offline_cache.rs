// Offline write-behind buffer for attendance mutations.
//
// Purpose
// - Hold WorkDay snapshots that could not be persisted, until the reconciler
//   drains them into the durable store.
//
// Responsibilities
// - One entry per (`worker_id`, `business_date`); a newer snapshot for the
//   same key supersedes the buffered one.
// - Track sync status and attempts so the reconciler can bound its retries.
//
// Boundaries
// - The cache never talks to the store itself; draining is the reconciler's
//   job.

use crate::core::work_day::WorkDay;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    Pending,
    Syncing,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedMutation {
    pub id: Uuid,
    pub worker_id: String,
    pub business_date: NaiveDate,
    pub snapshot: WorkDay,
    pub sync_status: SyncStatus,
    pub attempts: u32,
    pub last_attempt_at: Option<NaiveDateTime>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheCounts {
    pub pending: usize,
    pub syncing: usize,
    pub error: usize,
}

/// Process-scoped buffer, initialized at startup and swept by the reconciler
/// task. Not an ambient singleton.
#[derive(Default)]
pub struct OfflineCache {
    entries: Mutex<HashMap<(String, NaiveDate), CachedMutation>>,
}

impl OfflineCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer a snapshot. A snapshot already buffered under the same key is
    /// replaced; the fresh payload starts with a fresh retry budget.
    pub async fn put(&self, snapshot: WorkDay) {
        let key = (snapshot.worker_id.clone(), snapshot.business_date);
        let entry = CachedMutation {
            id: Uuid::now_v7(),
            worker_id: snapshot.worker_id.clone(),
            business_date: snapshot.business_date,
            snapshot,
            sync_status: SyncStatus::Pending,
            attempts: 0,
            last_attempt_at: None,
        };
        self.entries.lock().await.insert(key, entry);
    }

    /// The buffered snapshot for a key, if any. Buffered state is newer than
    /// whatever the durable store holds.
    pub async fn snapshot(&self, worker_id: &str, business_date: NaiveDate) -> Option<WorkDay> {
        self.entries
            .lock()
            .await
            .get(&(worker_id.to_string(), business_date))
            .map(|entry| entry.snapshot.clone())
    }

    /// Drop the entry for a key after the same state reached the store
    /// through the live write path.
    pub async fn discard(&self, worker_id: &str, business_date: NaiveDate) {
        self.entries
            .lock()
            .await
            .remove(&(worker_id.to_string(), business_date));
    }

    /// Claim every pending or errored entry for a sync pass, marking them
    /// `Syncing`. Returns clones; resolution goes through `resolve_synced`
    /// or `mark_failed` so a snapshot buffered mid-pass is never lost.
    pub async fn claim_batch(&self) -> Vec<CachedMutation> {
        let mut guard = self.entries.lock().await;
        let mut batch = Vec::new();
        for entry in guard.values_mut() {
            if entry.sync_status != SyncStatus::Syncing {
                entry.sync_status = SyncStatus::Syncing;
                batch.push(entry.clone());
            }
        }
        batch
    }

    /// Remove a successfully synced entry, unless a newer snapshot replaced
    /// it while the sync was in flight.
    pub async fn resolve_synced(&self, claimed: &CachedMutation) {
        let key = (claimed.worker_id.clone(), claimed.business_date);
        let mut guard = self.entries.lock().await;
        if guard.get(&key).is_some_and(|entry| entry.id == claimed.id) {
            guard.remove(&key);
        }
    }

    /// Record a failed sync attempt. Returns the attempt count, or `None`
    /// when a newer snapshot replaced the claimed entry in flight.
    pub async fn mark_failed(&self, claimed: &CachedMutation, now: NaiveDateTime) -> Option<u32> {
        let key = (claimed.worker_id.clone(), claimed.business_date);
        let mut guard = self.entries.lock().await;
        let entry = guard.get_mut(&key).filter(|entry| entry.id == claimed.id)?;
        entry.attempts += 1;
        entry.sync_status = SyncStatus::Error;
        entry.last_attempt_at = Some(now);
        Some(entry.attempts)
    }

    /// Give up on an entry past the retry ceiling.
    pub async fn drop_entry(&self, claimed: &CachedMutation) {
        let key = (claimed.worker_id.clone(), claimed.business_date);
        let mut guard = self.entries.lock().await;
        if guard.get(&key).is_some_and(|entry| entry.id == claimed.id) {
            guard.remove(&key);
        }
    }

    pub async fn counts(&self) -> CacheCounts {
        let guard = self.entries.lock().await;
        let mut counts = CacheCounts::default();
        for entry in guard.values() {
            match entry.sync_status {
                SyncStatus::Pending => counts.pending += 1,
                SyncStatus::Syncing => counts.syncing += 1,
                SyncStatus::Error => counts.error += 1,
            }
        }
        counts
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}
