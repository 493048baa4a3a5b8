// Night/overtime/holiday payroll calculator.
//
// Purpose
// - Convert finalized WorkDay records plus a PayConfig into per-day and
//   aggregated pay breakdowns. This is the single source of payroll math;
//   server reports and client previews both go through it.
//
// Responsibilities
// - Split worked minutes into regular/overtime at the 480-minute daily cap.
// - Overlap the shift with the recurring 22:00-05:00 night window.
// - Attribute night minutes to the regular bucket before overtime.
// - Floor each monetary sub-total to whole currency units independently,
//   then sum.
//
// Boundaries
// - Pure functions. No clock, no store, no logging.

use crate::core::pay_config::{EmploymentType, PayConfig};
use crate::core::ports::HolidayCalendar;
use crate::core::work_day::WorkDay;
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Daily threshold separating regular from overtime minutes for hourly workers.
pub const REGULAR_MINUTES_CAP: i64 = 480;

/// The night window runs 22:00-05:00, recurring nightly.
pub const NIGHT_START_HOUR: i64 = 22;
pub const NIGHT_END_HOUR: i64 = 5;

/// Premium rates for night work, fixed by labor rules rather than PayConfig.
pub const NIGHT_REGULAR_RATE: f64 = 1.25;
pub const NIGHT_OVERTIME_RATE: f64 = 1.50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyBreakdown {
    pub business_date: NaiveDate,
    pub is_holiday: bool,
    pub regular_minutes: i64,
    pub overtime_minutes: i64,
    pub night_regular_minutes: i64,
    pub night_overtime_minutes: i64,
    pub regular_pay: i64,
    pub overtime_pay: i64,
    pub night_pay: i64,
    pub night_overtime_pay: i64,
    pub holiday_bonus: i64,
    pub allowance: i64,
    pub total_pay: i64,
    pub anomaly: bool,
}

impl DailyBreakdown {
    fn empty(business_date: NaiveDate, is_holiday: bool, anomaly: bool) -> Self {
        Self {
            business_date,
            is_holiday,
            regular_minutes: 0,
            overtime_minutes: 0,
            night_regular_minutes: 0,
            night_overtime_minutes: 0,
            regular_pay: 0,
            overtime_pay: 0,
            night_pay: 0,
            night_overtime_pay: 0,
            holiday_bonus: 0,
            allowance: 0,
            total_pay: 0,
            anomaly,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayrollReport {
    pub days: Vec<DailyBreakdown>,
    pub regular_minutes: i64,
    pub overtime_minutes: i64,
    pub night_regular_minutes: i64,
    pub night_overtime_minutes: i64,
    pub regular_pay: i64,
    pub overtime_pay: i64,
    pub night_pay: i64,
    pub night_overtime_pay: i64,
    pub holiday_bonus: i64,
    pub allowance: i64,
    /// Fixed salary for monthly employees, zero for hourly ones.
    pub base_salary: i64,
    pub monthly_fixed_allowance: i64,
    pub total_pay: i64,
    pub anomaly_days: usize,
}

/// Overlap of [start, end] with the recurring night window, in whole minutes.
/// Each calendar day d contributes the occurrence [d 22:00, d+1 05:00];
/// occurrences never touch, so nothing is counted twice.
pub fn night_overlap_minutes(start: NaiveDateTime, end: NaiveDateTime) -> i64 {
    if end <= start {
        return 0;
    }
    let mut total = 0;
    // Start one day early so the morning tail (00:00-05:00) of the window
    // anchored to the previous evening is covered.
    let mut day = start.date() - Duration::days(1);
    while day <= end.date() {
        let midnight = day.and_time(NaiveTime::MIN);
        let window_start = midnight + Duration::hours(NIGHT_START_HOUR);
        let window_end = midnight + Duration::hours(24 + NIGHT_END_HOUR);
        let overlap_start = start.max(window_start);
        let overlap_end = end.min(window_end);
        if overlap_end > overlap_start {
            total += (overlap_end - overlap_start).num_minutes();
        }
        day += Duration::days(1);
    }
    total
}

/// One monetary bucket: minutes at an hourly rate and a multiplier, floored
/// to whole currency units.
fn bucket_pay(minutes: i64, hourly_rate: i64, multiplier: f64) -> i64 {
    ((minutes as f64 / 60.0) * hourly_rate as f64 * multiplier).floor() as i64
}

pub fn compute_daily_pay(day: &WorkDay, config: &PayConfig, is_holiday: bool) -> DailyBreakdown {
    let (Some(clock_in), Some(clock_out)) = (day.clock_in, day.clock_out) else {
        // Not finalized yet, nothing to pay.
        return DailyBreakdown::empty(day.business_date, is_holiday, day.anomaly);
    };

    let total_minutes = day.paid_minutes();

    let (regular_minutes, overtime_minutes, night_minutes) = match &config.employment {
        EmploymentType::Hourly => {
            let regular = total_minutes.min(REGULAR_MINUTES_CAP);
            let overtime = (total_minutes - REGULAR_MINUTES_CAP).max(0);
            // The night window is anchored to the clock-in's calendar day,
            // not the business day.
            let night = night_overlap_minutes(clock_in, clock_out);
            (regular, overtime, night)
        }
        EmploymentType::Monthly {
            scheduled_start,
            scheduled_end,
            count_early_arrival_as_overtime,
            ..
        } => {
            // Regular hours are covered by the fixed salary; only minutes
            // outside the scheduled window count, capped at what was
            // actually worked.
            let schedule_end = clock_in.date().and_time(*scheduled_end);
            let schedule_start = clock_in.date().and_time(*scheduled_start);
            let mut overtime = (clock_out - schedule_end).num_minutes().max(0);
            if *count_early_arrival_as_overtime {
                overtime += (schedule_start - clock_in).num_minutes().max(0);
            }
            (0, overtime.min(total_minutes), 0)
        }
    };

    let night_regular_minutes = night_minutes.min(regular_minutes);
    let night_overtime_minutes = (night_minutes - night_regular_minutes).min(overtime_minutes);

    let regular_pay = bucket_pay(regular_minutes - night_regular_minutes, config.hourly_wage, 1.0);
    let overtime_pay = bucket_pay(
        overtime_minutes - night_overtime_minutes,
        config.hourly_wage,
        config.overtime_multiplier,
    );
    let night_pay = bucket_pay(night_regular_minutes, config.hourly_wage, NIGHT_REGULAR_RATE);
    let night_overtime_pay = bucket_pay(
        night_overtime_minutes,
        config.hourly_wage,
        NIGHT_OVERTIME_RATE,
    );
    let holiday_bonus = if is_holiday {
        bucket_pay(total_minutes, config.holiday_bonus_per_hour, 1.0)
    } else {
        0
    };
    let allowance = config.daily_allowance;

    let total_pay =
        regular_pay + overtime_pay + night_pay + night_overtime_pay + holiday_bonus + allowance;

    DailyBreakdown {
        business_date: day.business_date,
        is_holiday,
        regular_minutes,
        overtime_minutes,
        night_regular_minutes,
        night_overtime_minutes,
        regular_pay,
        overtime_pay,
        night_pay,
        night_overtime_pay,
        holiday_bonus,
        allowance,
        total_pay,
        anomaly: day.anomaly,
    }
}

/// Aggregate a range of finalized days. `base_monthly_salary` and
/// `monthly_fixed_allowance` are added once, not per day.
pub fn compute_payroll(
    days: &[WorkDay],
    config: &PayConfig,
    calendar: &dyn HolidayCalendar,
) -> PayrollReport {
    let breakdowns: Vec<DailyBreakdown> = days
        .iter()
        .map(|day| compute_daily_pay(day, config, calendar.is_holiday(day.business_date)))
        .collect();

    let base_salary = match &config.employment {
        EmploymentType::Hourly => 0,
        EmploymentType::Monthly {
            base_monthly_salary, ..
        } => *base_monthly_salary,
    };

    let mut report = PayrollReport {
        days: Vec::new(),
        regular_minutes: 0,
        overtime_minutes: 0,
        night_regular_minutes: 0,
        night_overtime_minutes: 0,
        regular_pay: 0,
        overtime_pay: 0,
        night_pay: 0,
        night_overtime_pay: 0,
        holiday_bonus: 0,
        allowance: 0,
        base_salary,
        monthly_fixed_allowance: config.monthly_fixed_allowance,
        total_pay: base_salary + config.monthly_fixed_allowance,
        anomaly_days: 0,
    };
    for b in &breakdowns {
        report.regular_minutes += b.regular_minutes;
        report.overtime_minutes += b.overtime_minutes;
        report.night_regular_minutes += b.night_regular_minutes;
        report.night_overtime_minutes += b.night_overtime_minutes;
        report.regular_pay += b.regular_pay;
        report.overtime_pay += b.overtime_pay;
        report.night_pay += b.night_pay;
        report.night_overtime_pay += b.night_overtime_pay;
        report.holiday_bonus += b.holiday_bonus;
        report.allowance += b.allowance;
        report.total_pay += b.total_pay;
        if b.anomaly {
            report.anomaly_days += 1;
        }
    }
    report.days = breakdowns;
    report
}
