// In memory implementation of the WorkDayStore port.
//
// Purpose
// - Support service and reconciler tests and local development without a
//   database.
//
// Responsibilities
// - One row per (`worker_id`, `business_date`), matching the uniqueness
//   constraint of the relational store.
// - Simulate an outage through the offline switch.

use crate::core::ports::{StoreError, WorkDayStore};
use crate::core::work_day::WorkDay;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

#[derive(Default)]
pub struct InMemoryWorkDayStore {
    rows: RwLock<HashMap<(String, NaiveDate), WorkDay>>,
    offline: AtomicBool,
}

impl InMemoryWorkDayStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip the simulated outage at runtime, also while shared behind an Arc.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub async fn count(&self) -> usize {
        self.rows.read().await.len()
    }

    fn check_online(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("work day store offline".into()));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl WorkDayStore for InMemoryWorkDayStore {
    async fn find(
        &self,
        worker_id: &str,
        business_date: NaiveDate,
    ) -> Result<Option<WorkDay>, StoreError> {
        self.check_online()?;
        Ok(self
            .rows
            .read()
            .await
            .get(&(worker_id.to_string(), business_date))
            .cloned())
    }

    async fn upsert(&self, day: &WorkDay) -> Result<(), StoreError> {
        self.check_online()?;
        self.rows
            .write()
            .await
            .insert((day.worker_id.clone(), day.business_date), day.clone());
        Ok(())
    }

    async fn list_range(
        &self,
        worker_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<WorkDay>, StoreError> {
        self.check_online()?;
        let guard = self.rows.read().await;
        let mut days: Vec<WorkDay> = guard
            .iter()
            .filter(|((id, date), _)| id == worker_id && (from..=to).contains(date))
            .map(|(_, day)| day.clone())
            .collect();
        days.sort_by_key(|day| day.business_date);
        Ok(days)
    }
}
