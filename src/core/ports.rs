// Ports define what the core needs from the outside world, without implementing it.
//
// Purpose
// - Describe the durable store, the wall clock, the holiday calendar and the
//   pay configuration source as traits.
//
// Boundaries
// - No concrete input or output here. Adapters implement these traits in the
//   adapters layer.
//
// Testing guidance
// - Provide in memory implementations for tests and local development.

use crate::core::pay_config::PayConfig;
use crate::core::work_day::WorkDay;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store cannot be reached right now. Writes hitting this are
    /// absorbed by the offline cache instead of failing the caller.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("backend error: {0}")]
    Backend(String),
}

/// Durable storage for WorkDay records, unique per
/// (`worker_id`, `business_date`).
#[async_trait]
pub trait WorkDayStore: Send + Sync {
    async fn find(
        &self,
        worker_id: &str,
        business_date: NaiveDate,
    ) -> Result<Option<WorkDay>, StoreError>;

    /// Insert-or-update on the natural key. Replaying the same snapshot
    /// twice must not create a second record.
    async fn upsert(&self, day: &WorkDay) -> Result<(), StoreError>;

    async fn list_range(
        &self,
        worker_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<WorkDay>, StoreError>;
}

pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Holiday lookup is supplied from outside, never computed internally.
pub trait HolidayCalendar: Send + Sync {
    fn is_holiday(&self, date: NaiveDate) -> bool;
}

pub trait PayConfigSource: Send + Sync {
    fn pay_config(&self, worker_id: &str) -> Option<PayConfig>;
}
