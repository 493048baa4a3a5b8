// Reconciler: drains the offline cache into the durable store.
//
// Purpose
// - Replay buffered WorkDay snapshots with at-least-once delivery; upserting
//   by the natural key keeps the replay idempotent.
//
// Responsibilities
// - Per-entry upserts only, never a lock across the whole store, so live
//   clock traffic is never blocked.
// - Bound the retries: past the ceiling an entry is dropped and the loss is
//   logged at error severity.

use crate::application::offline_cache::OfflineCache;
use crate::core::ports::{Clock, WorkDayStore};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DrainReport {
    pub success: usize,
    pub failed: usize,
}

pub struct Reconciler {
    store: Arc<dyn WorkDayStore>,
    cache: Arc<OfflineCache>,
    clock: Arc<dyn Clock>,
    max_attempts: u32,
}

impl Reconciler {
    pub fn new(
        store: Arc<dyn WorkDayStore>,
        cache: Arc<OfflineCache>,
        clock: Arc<dyn Clock>,
        max_attempts: u32,
    ) -> Self {
        Self {
            store,
            cache,
            clock,
            max_attempts,
        }
    }

    /// One sync pass over every pending or errored entry. Also invoked
    /// directly through the force-reconcile endpoint.
    pub async fn drain_once(&self) -> DrainReport {
        let batch = self.cache.claim_batch().await;
        let mut report = DrainReport::default();
        for entry in batch {
            match self.store.upsert(&entry.snapshot).await {
                Ok(()) => {
                    self.cache.resolve_synced(&entry).await;
                    report.success += 1;
                }
                Err(err) => {
                    report.failed += 1;
                    let Some(attempts) =
                        self.cache.mark_failed(&entry, self.clock.now()).await
                    else {
                        // Superseded mid-flight by a newer snapshot; that one
                        // gets its own pass.
                        continue;
                    };
                    if attempts >= self.max_attempts {
                        error!(
                            worker_id = %entry.worker_id,
                            business_date = %entry.business_date,
                            attempts,
                            %err,
                            "dropping buffered mutation past the retry ceiling"
                        );
                        self.cache.drop_entry(&entry).await;
                    } else {
                        warn!(
                            worker_id = %entry.worker_id,
                            business_date = %entry.business_date,
                            attempts,
                            %err,
                            "sync attempt failed, will retry"
                        );
                    }
                }
            }
        }
        if report.success > 0 {
            info!(synced = report.success, "drained offline cache entries");
        }
        report
    }
}
