// Per-worker pay configuration, a read-only input to the payroll calculator.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum EmploymentType {
    Hourly,
    Monthly {
        base_monthly_salary: i64,
        scheduled_start: NaiveTime,
        scheduled_end: NaiveTime,
        count_early_arrival_as_overtime: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayConfig {
    /// Currency units per hour. Also the overtime base for monthly employees.
    pub hourly_wage: i64,
    /// Flat addition per hour worked on a holiday, not a multiplier.
    pub holiday_bonus_per_hour: i64,
    /// Applied to non-night overtime minutes. Must be >= 1.0.
    pub overtime_multiplier: f64,
    /// Fixed amount per attended day (commute subsidy and the like).
    pub daily_allowance: i64,
    /// Added once per aggregated payroll report.
    pub monthly_fixed_allowance: i64,
    pub employment: EmploymentType,
}

impl PayConfig {
    pub fn hourly(hourly_wage: i64) -> Self {
        Self {
            hourly_wage,
            holiday_bonus_per_hour: 0,
            overtime_multiplier: 1.25,
            daily_allowance: 0,
            monthly_fixed_allowance: 0,
            employment: EmploymentType::Hourly,
        }
    }

    pub fn monthly(
        hourly_wage: i64,
        base_monthly_salary: i64,
        scheduled_start: NaiveTime,
        scheduled_end: NaiveTime,
    ) -> Self {
        Self {
            hourly_wage,
            holiday_bonus_per_hour: 0,
            overtime_multiplier: 1.25,
            daily_allowance: 0,
            monthly_fixed_allowance: 0,
            employment: EmploymentType::Monthly {
                base_monthly_salary,
                scheduled_start,
                scheduled_end,
                count_early_arrival_as_overtime: false,
            },
        }
    }
}
