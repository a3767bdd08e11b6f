//! Display-ready view of a gestational age.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::calculator::{compute, GestationalAge, FULL_TERM_WEEKS};

/// Message shown instead of a negative age.
pub const FUTURE_DATE_MESSAGE: &str = "Future date entered";

/// Message shown once past term.
pub const OVERDUE_MESSAGE: &str = "Overdue";

/// Everything a patient card or form preview renders for one LMP.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GestationSummary {
    pub age: GestationalAge,
    /// LMP lies after the reference day
    pub is_future_date: bool,
    /// "week" or "weeks"
    pub week_label: String,
    /// "day" or "days"
    pub day_label: String,
    /// e.g. "Second Trimester"
    pub trimester_label: String,
    /// Weeks remaining until 40; `None` once overdue or for a future LMP
    pub weeks_to_go: Option<i64>,
    /// "Overdue", "N weeks to go", or the future-date message
    pub status_line: String,
    /// Progress bar fill, capped at 100
    pub progress_percent: f64,
    /// e.g. "Jan 1, 2024"
    pub lmp_display: String,
    /// e.g. "October 7, 2024"
    pub due_date_display: String,
}

impl GestationSummary {
    /// Build the summary for `lmp` on `today`.
    pub fn new(lmp: NaiveDate, today: NaiveDate) -> Self {
        Self::from_age(lmp, compute(lmp, today))
    }

    /// Build from an already computed age.
    pub fn from_age(lmp: NaiveDate, age: GestationalAge) -> Self {
        let is_future_date = age.is_future();
        let weeks_to_go =
            (!age.is_overdue && !is_future_date).then(|| FULL_TERM_WEEKS - age.weeks);

        let status_line = if is_future_date {
            FUTURE_DATE_MESSAGE.to_string()
        } else if age.is_overdue {
            OVERDUE_MESSAGE.to_string()
        } else {
            format!("{} weeks to go", FULL_TERM_WEEKS - age.weeks)
        };

        Self {
            age,
            is_future_date,
            week_label: unit_label(age.weeks, "week"),
            day_label: unit_label(age.days, "day"),
            trimester_label: age.trimester.label().to_string(),
            weeks_to_go,
            status_line,
            progress_percent: age.progress_percent(),
            lmp_display: lmp.format("%b %-d, %Y").to_string(),
            due_date_display: age.due_date.format("%B %-d, %Y").to_string(),
        }
    }
}

fn unit_label(count: i64, unit: &str) -> String {
    if count == 1 {
        unit.to_string()
    } else {
        format!("{}s", unit)
    }
}
