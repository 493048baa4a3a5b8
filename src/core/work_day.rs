// WorkDay is the canonical domain state of one worker on one business day.
//
// Purpose
// - Hold the attendance record (clock in, breaks, clock out) and apply clock
//   events as explicit state transitions.
//
// Responsibilities
// - Enforce the transition rules: NotStarted -> Working -> {OnBreak <-> Working}
//   -> Finished -> (re-clock-in) -> Working.
// - Keep minutes already earned on the same business day across a re-clock-in.
//
// Boundaries
// - This file must not perform input or output. Persistence and retries live
//   in the application layer.

use crate::core::business_date::business_date;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkDayStatus {
    NotStarted,
    Working,
    OnBreak,
    Finished,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakInterval {
    pub break_start: NaiveDateTime,
    pub break_end: Option<NaiveDateTime>,
    /// Whole minutes, floored, computed when the break closes.
    pub minutes: Option<i64>,
}

#[derive(Debug, thiserror::Error, Clone, Copy, PartialEq, Eq)]
pub enum ClockError {
    #[error("already clocked in for this business day")]
    AlreadyWorking,
    #[error("not currently working")]
    NotWorking,
    #[error("not currently on break")]
    NotOnBreak,
    #[error("not clocked in")]
    NotClockedIn,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkDay {
    pub id: Uuid,
    pub worker_id: String,
    pub business_date: NaiveDate,
    pub clock_in: Option<NaiveDateTime>,
    pub clock_out: Option<NaiveDateTime>,
    pub status: WorkDayStatus,
    pub breaks: Vec<BreakInterval>,
    pub total_break_minutes: i64,
    /// Minutes of the current stint, set on clock-out.
    pub work_minutes: i64,
    /// Minutes accumulated from earlier stints on the same business day.
    pub prior_work_minutes: i64,
    /// Set when a computed duration had to be clamped at zero. The record is
    /// kept for manual review instead of being silently corrected.
    pub anomaly: bool,
}

impl WorkDay {
    /// First clock-in of a business date creates the record in `Working`.
    pub fn open(worker_id: impl Into<String>, now: NaiveDateTime) -> Self {
        Self {
            id: Uuid::now_v7(),
            worker_id: worker_id.into(),
            business_date: business_date(now),
            clock_in: Some(now),
            clock_out: None,
            status: WorkDayStatus::Working,
            breaks: Vec::new(),
            total_break_minutes: 0,
            work_minutes: 0,
            prior_work_minutes: 0,
            anomaly: false,
        }
    }

    /// Clock in on an existing record. Rejected while a stint is open; on a
    /// finished day this is a re-clock-in: the finished stint's minutes fold
    /// into `prior_work_minutes` and a fresh stint starts.
    pub fn clock_in(&mut self, now: NaiveDateTime) -> Result<(), ClockError> {
        if self.clock_in.is_some() && self.clock_out.is_none() {
            return Err(ClockError::AlreadyWorking);
        }
        self.prior_work_minutes += self.work_minutes;
        self.clock_in = Some(now);
        self.clock_out = None;
        self.breaks.clear();
        self.total_break_minutes = 0;
        self.work_minutes = 0;
        self.status = WorkDayStatus::Working;
        Ok(())
    }

    pub fn break_start(&mut self, now: NaiveDateTime) -> Result<(), ClockError> {
        if self.status != WorkDayStatus::Working {
            return Err(ClockError::NotWorking);
        }
        self.breaks.push(BreakInterval {
            break_start: now,
            break_end: None,
            minutes: None,
        });
        self.status = WorkDayStatus::OnBreak;
        Ok(())
    }

    pub fn break_end(&mut self, now: NaiveDateTime) -> Result<(), ClockError> {
        if self.status != WorkDayStatus::OnBreak {
            return Err(ClockError::NotOnBreak);
        }
        self.close_open_break(now);
        self.status = WorkDayStatus::Working;
        Ok(())
    }

    /// Close the day. An open break is force-closed first, exactly as
    /// `break_end` would. `work_minutes` never goes negative: a negative
    /// result is clamped at zero and the record is flagged as an anomaly.
    pub fn clock_out(&mut self, now: NaiveDateTime) -> Result<(), ClockError> {
        let Some(clock_in) = self.clock_in else {
            return Err(ClockError::NotClockedIn);
        };
        if self.clock_out.is_some() {
            return Err(ClockError::NotClockedIn);
        }
        if self.status == WorkDayStatus::OnBreak {
            self.close_open_break(now);
        }
        self.total_break_minutes = self.breaks.iter().filter_map(|b| b.minutes).sum();
        let worked = (now - clock_in).num_minutes() - self.total_break_minutes;
        if worked < 0 {
            self.anomaly = true;
        }
        self.work_minutes = worked.max(0);
        self.clock_out = Some(now);
        self.status = WorkDayStatus::Finished;
        Ok(())
    }

    /// Total pay-relevant minutes on this business day, across all stints.
    pub fn paid_minutes(&self) -> i64 {
        self.prior_work_minutes + self.work_minutes
    }

    pub fn open_break(&self) -> Option<&BreakInterval> {
        self.breaks.iter().find(|b| b.break_end.is_none())
    }

    fn close_open_break(&mut self, now: NaiveDateTime) {
        if let Some(open) = self.breaks.iter_mut().find(|b| b.break_end.is_none()) {
            let minutes = (now - open.break_start).num_minutes().max(0);
            open.break_end = Some(now);
            open.minutes = Some(minutes);
        }
    }
}
