// Holiday calendar backed by an explicit set of dates.

use crate::core::ports::HolidayCalendar;
use chrono::NaiveDate;
use std::collections::HashSet;

#[derive(Default)]
pub struct FixedHolidayCalendar {
    dates: HashSet<NaiveDate>,
}

impl FixedHolidayCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dates(dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        Self {
            dates: dates.into_iter().collect(),
        }
    }
}

impl HolidayCalendar for FixedHolidayCalendar {
    fn is_holiday(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date)
    }
}

#[cfg(test)]
mod fixed_holiday_calendar_tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn it_should_only_mark_the_configured_dates() {
        let holiday = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let calendar = FixedHolidayCalendar::with_dates([holiday]);
        assert!(calendar.is_holiday(holiday));
        assert!(!calendar.is_holiday(holiday.succ_opt().unwrap()));
    }
}
