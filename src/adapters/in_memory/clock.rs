// Clock adapters.
//
// Purpose
// - SystemClock feeds the service wall-clock time in production; ManualClock
//   lets tests and local development walk time forward deterministically.

use crate::core::ports::Clock;
use chrono::{Duration, Local, NaiveDateTime};
use std::sync::Mutex;

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

pub struct ManualClock {
    now: Mutex<NaiveDateTime>,
}

impl ManualClock {
    pub fn starting_at(at: NaiveDateTime) -> Self {
        Self { now: Mutex::new(at) }
    }

    pub fn set(&self, at: NaiveDateTime) {
        *self.now.lock().unwrap() = at;
    }

    pub fn advance_minutes(&self, minutes: i64) {
        let mut guard = self.now.lock().unwrap();
        *guard += Duration::minutes(minutes);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> NaiveDateTime {
        *self.now.lock().unwrap()
    }
}
