// Business-date bucketing.
//
// Purpose
// - Map wall-clock timestamps onto the 04:00-anchored business day used to
//   group attendance. A shift that runs past midnight stays on the day it
//   started.
//
// Boundaries
// - Pure functions only. No clock access, no input or output.

use chrono::{Duration, NaiveDate, NaiveDateTime, Timelike};

/// Hour at which one business day rolls over into the next.
pub const DAY_BOUNDARY_HOUR: u32 = 4;

/// A timestamp between 00:00 and 03:59:59 belongs to the previous calendar
/// date's business day; everything from 04:00 onward belongs to its own.
pub fn business_date(at: NaiveDateTime) -> NaiveDate {
    if at.hour() < DAY_BOUNDARY_HOUR {
        at.date() - Duration::days(1)
    } else {
        at.date()
    }
}
