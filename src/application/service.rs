// Attendance service: the write-side orchestration of clock events.
//
// Purpose
// - Validate a clock request, apply the state transition under a per-worker
//   per-business-day lock, persist the result, and absorb store outages into
//   the offline cache.
//
// Responsibilities
// - Serialize transitions per (`worker_id`, `business_date`); cross-worker
//   traffic runs in parallel.
// - Detect retried requests and answer them with the current record instead
//   of a conflict.
// - Read through the offline cache: a buffered snapshot is newer than the
//   stored row.
//
// Boundaries
// - The only component that touches persistence. The state machine itself
//   lives in `core::work_day`; payroll math in `core::payroll`.

use crate::application::errors::ServiceError;
use crate::application::offline_cache::{CacheCounts, OfflineCache};
use crate::core::business_date::business_date;
use crate::core::payroll::{self, PayrollReport};
use crate::core::ports::{Clock, HolidayCalendar, PayConfigSource, StoreError, WorkDayStore};
use crate::core::work_day::{ClockError, WorkDay};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// How long a repeated identical request is treated as a network retry of an
/// already-applied transition rather than a genuine conflict.
const RETRY_GRACE_SECONDS: i64 = 90;

/// Retry memos older than this are swept by the background task.
const MEMO_TTL_HOURS: i64 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClockOp {
    ClockIn,
    BreakStart,
    BreakEnd,
    ClockOut,
}

#[derive(Clone, Copy)]
struct AppliedOp {
    op: ClockOp,
    at: NaiveDateTime,
}

/// Outcome of a clock operation. `durable: false` means the mutation was
/// accepted but is buffered in the offline cache, waiting for the store to
/// come back.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Accepted {
    pub work_day: WorkDay,
    pub durable: bool,
}

type DayKey = (String, NaiveDate);

pub struct AttendanceService {
    store: Arc<dyn WorkDayStore>,
    cache: Arc<OfflineCache>,
    clock: Arc<dyn Clock>,
    calendar: Arc<dyn HolidayCalendar>,
    configs: Arc<dyn PayConfigSource>,
    locks: Mutex<HashMap<DayKey, Arc<Mutex<()>>>>,
    applied: Mutex<HashMap<DayKey, AppliedOp>>,
}

impl AttendanceService {
    pub fn new(
        store: Arc<dyn WorkDayStore>,
        cache: Arc<OfflineCache>,
        clock: Arc<dyn Clock>,
        calendar: Arc<dyn HolidayCalendar>,
        configs: Arc<dyn PayConfigSource>,
    ) -> Self {
        Self {
            store,
            cache,
            clock,
            calendar,
            configs,
            locks: Mutex::new(HashMap::new()),
            applied: Mutex::new(HashMap::new()),
        }
    }

    pub async fn clock_in(&self, worker_id: &str) -> Result<Accepted, ServiceError> {
        self.apply(worker_id, ClockOp::ClockIn).await
    }

    pub async fn break_start(&self, worker_id: &str) -> Result<Accepted, ServiceError> {
        self.apply(worker_id, ClockOp::BreakStart).await
    }

    pub async fn break_end(&self, worker_id: &str) -> Result<Accepted, ServiceError> {
        self.apply(worker_id, ClockOp::BreakEnd).await
    }

    pub async fn clock_out(&self, worker_id: &str) -> Result<Accepted, ServiceError> {
        self.apply(worker_id, ClockOp::ClockOut).await
    }

    /// Today's record for a worker, buffered or stored, if any.
    pub async fn today_record(&self, worker_id: &str) -> Result<Option<WorkDay>, ServiceError> {
        let worker_id = validated(worker_id)?;
        let date = business_date(self.clock.now());
        Ok(self.load_current(worker_id, date).await?.map(|(day, _)| day))
    }

    /// Payroll over a closed date range of finalized records. Reads go to the
    /// durable store only; buffered mutations land there via the reconciler
    /// before they show up here.
    pub async fn payroll(
        &self,
        worker_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<PayrollReport, ServiceError> {
        let worker_id = validated(worker_id)?;
        if from > to {
            return Err(ServiceError::Validation(
                "range start must not be after range end".into(),
            ));
        }
        let config = self
            .configs
            .pay_config(worker_id)
            .ok_or_else(|| ServiceError::Validation(format!("no pay config for {worker_id}")))?;

        let mut days = self.store.list_range(worker_id, from, to).await?;
        days.retain(|day| day.clock_out.is_some());
        Ok(payroll::compute_payroll(&days, &config, self.calendar.as_ref()))
    }

    pub async fn cache_status(&self) -> CacheCounts {
        self.cache.counts().await
    }

    /// Drop retry memos past their TTL and lock entries for past business
    /// days. Called periodically by the background task.
    pub async fn sweep_stale(&self) {
        let now = self.clock.now();
        let today = business_date(now);
        let cutoff = now - Duration::hours(MEMO_TTL_HOURS);
        self.applied.lock().await.retain(|_, memo| memo.at > cutoff);
        self.locks
            .lock()
            .await
            .retain(|(_, date), lock| *date == today || Arc::strong_count(lock) > 1);
    }

    async fn apply(&self, worker_id: &str, op: ClockOp) -> Result<Accepted, ServiceError> {
        let worker_id = validated(worker_id)?;
        let now = self.clock.now();
        let date = business_date(now);
        let key: DayKey = (worker_id.to_string(), date);

        let lock = self.key_lock(&key).await;
        let _guard = lock.lock().await;

        let loaded = self.load_current(worker_id, date).await?;
        let transition = match loaded {
            None => match op {
                ClockOp::ClockIn => Ok((WorkDay::open(worker_id, now), true)),
                ClockOp::BreakStart => Err(ClockError::NotWorking),
                ClockOp::BreakEnd => Err(ClockError::NotOnBreak),
                ClockOp::ClockOut => Err(ClockError::NotClockedIn),
            },
            Some((mut day, durable)) => {
                let applied = match op {
                    ClockOp::ClockIn => day.clock_in(now),
                    ClockOp::BreakStart => day.break_start(now),
                    ClockOp::BreakEnd => day.break_end(now),
                    ClockOp::ClockOut => day.clock_out(now),
                };
                match applied {
                    Ok(()) => Ok((day, durable)),
                    Err(conflict) => {
                        if self.was_just_applied(&key, op, now).await {
                            // Network retry of a transition that already
                            // went through; answer with the current state.
                            debug!(worker_id, ?op, "retried request answered idempotently");
                            return Ok(Accepted {
                                work_day: day,
                                durable,
                            });
                        }
                        Err(conflict)
                    }
                }
            }
        };

        let (day, _) = transition.map_err(ServiceError::Conflict)?;
        if day.anomaly {
            warn!(
                worker_id,
                business_date = %day.business_date,
                "work minutes clamped at zero, record flagged for review"
            );
        }

        let durable = match self.store.upsert(&day).await {
            Ok(()) => {
                // Whatever was buffered for this key is now stale.
                self.cache.discard(worker_id, date).await;
                true
            }
            Err(StoreError::Unavailable(reason)) => {
                warn!(
                    worker_id,
                    business_date = %date,
                    %reason,
                    "store unavailable, mutation buffered for reconciliation"
                );
                self.cache.put(day.clone()).await;
                false
            }
            Err(err) => return Err(err.into()),
        };

        self.applied
            .lock()
            .await
            .insert(key, AppliedOp { op, at: now });

        Ok(Accepted {
            work_day: day,
            durable,
        })
    }

    /// Buffered snapshot first, then the durable store. An unreachable store
    /// on the read path behaves like an empty one so that clock actions stay
    /// available during an outage.
    async fn load_current(
        &self,
        worker_id: &str,
        date: NaiveDate,
    ) -> Result<Option<(WorkDay, bool)>, StoreError> {
        if let Some(snapshot) = self.cache.snapshot(worker_id, date).await {
            return Ok(Some((snapshot, false)));
        }
        match self.store.find(worker_id, date).await {
            Ok(found) => Ok(found.map(|day| (day, true))),
            Err(StoreError::Unavailable(reason)) => {
                warn!(worker_id, %reason, "store unavailable on read, treating as no record");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    async fn was_just_applied(&self, key: &DayKey, op: ClockOp, now: NaiveDateTime) -> bool {
        self.applied
            .lock()
            .await
            .get(key)
            .is_some_and(|memo| {
                memo.op == op && (now - memo.at).num_seconds() <= RETRY_GRACE_SECONDS
            })
    }

    async fn key_lock(&self, key: &DayKey) -> Arc<Mutex<()>> {
        self.locks
            .lock()
            .await
            .entry(key.clone())
            .or_default()
            .clone()
    }
}

fn validated(worker_id: &str) -> Result<&str, ServiceError> {
    let trimmed = worker_id.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::Validation("worker id must not be blank".into()));
    }
    Ok(trimmed)
}
